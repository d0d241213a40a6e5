const ART: &str = r"
   ____       _       _
  / ___| ___ | |_ ___| |__   __ _
 | |  _ / _ \| __/ __| '_ \ / _` |
 | |_| | (_) | || (__| | | | (_| |
  \____|\___/ \__\___|_| |_|\__,_|
";

/// Print the banner to stderr so it never mixes with a report on stdout.
pub fn print() {
    eprintln!("{ART}");
    eprintln!(
        "  v{}  account discovery by username or email\n",
        env!("CARGO_PKG_VERSION")
    );
}
