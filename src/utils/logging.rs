pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        // disable printing the name of the module in every log line.
        .with_target(false)
        // keep the output free of ANSI color codes so it can be collected as plain json.
        .with_ansi(false)
        // the collector stamps each line on ingestion.
        .without_time()
        .json()
        .init();
}
