use std::io::{self, BufWriter};

use anyhow::Context;

use materialtrace_infra::FulfillmentConfig;
use materialtrace_node::Node;

fn main() -> anyhow::Result<()> {
    let config = FulfillmentConfig::from_env().context("loading configuration")?;
    materialtrace_observability::init_with(config.log_format);

    tracing::info!(?config, "materialtrace node reading invocations from stdin");

    let node = Node::new(config);
    let stdin = io::stdin().lock();
    let stdout = BufWriter::new(io::stdout().lock());
    let summary = node.run(stdin, stdout)?;

    tracing::info!(
        invocations = summary.invocations,
        failures = summary.failures,
        events = summary.events,
        "input closed"
    );
    Ok(())
}
