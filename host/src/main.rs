//! MQT Equalizer host
//!
//! Reads control-surface lines on stdin, prints acks on stdout, logs on stderr.

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    mqt_host_lib::run().await
}
