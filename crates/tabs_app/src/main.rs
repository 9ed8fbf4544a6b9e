mod cli;
mod config;
mod report;

use std::fs;
use std::sync::mpsc;

use anyhow::{bail, Context};
use clap::Parser;
use tabs_core::{Document, NodeId};
use tabs_engine::{AtomicFileWriter, ChannelEventSink, EngineHandle, HostSettings, TabsHost};
use tabs_logging::{tabs_info, tabs_warn};
use url::Url;

use crate::cli::{ArrowKey, Cli};
use crate::config::AppConfig;
use crate::report::Summary;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = config::load(cli.config.as_deref())?;
    cli.apply_overrides(&mut config);
    tabs_logging::initialize(&config.log.destination(), config.log.level_filter());

    let summary = run(&cli, &config)?;
    if cli.json {
        println!("{}", summary.render_json()?);
    } else {
        print!("{}", summary.render_text());
    }
    Ok(())
}

fn run(cli: &Cli, config: &AppConfig) -> anyhow::Result<Summary> {
    let markup = fs::read_to_string(&cli.input)
        .with_context(|| format!("reading {}", cli.input.display()))?;
    let origin = config
        .origin
        .as_deref()
        .map(Url::parse)
        .transpose()
        .context("origin is not a valid URL")?;

    let (tx, events) = mpsc::channel();
    let mut host = TabsHost::new(
        Document::parse(&markup),
        EngineHandle::new(config.fetch.to_settings(), origin)?,
        Box::new(ChannelEventSink::new(tx)),
        HostSettings {
            priming_timeout: config.priming_timeout(),
        },
    );

    let mounted = host.boot();
    tabs_info!("Mounted {mounted} widget(s) from {}", cli.input.display());
    let settled = host.run_until_settled(config.settle_wait());
    if !settled {
        tabs_warn!(
            "{} fetch(es) still outstanding after {:?}",
            host.outstanding_jobs(),
            config.settle_wait()
        );
    }

    replay(&mut host, &cli.clicks, &cli.keys)?;

    if let Some(output) = &cli.output {
        let writer = AtomicFileWriter::new(output);
        let path = writer.write(&host.document().to_html())?;
        tabs_info!("Wrote {}", path.display());
    }

    Ok(Summary::collect(&host, settled, events.try_iter().count()))
}

fn replay(host: &mut TabsHost, clicks: &[String], keys: &[ArrowKey]) -> anyhow::Result<()> {
    for id in clicks {
        let target = element_by_id(host.document(), id)
            .with_context(|| format!("--click {id}: no such element"))?;
        host.click(target);
    }

    for &key in keys {
        let Some(tab) = focused_or_active_tab(host) else {
            bail!("--key: no tab to press keys on");
        };
        host.focus(tab);
        if !host.keydown(tab, key.into()) {
            tabs_warn!("Key {key:?} on a tab had no effect");
        }
    }
    Ok(())
}

fn element_by_id(doc: &Document, id: &str) -> Option<NodeId> {
    doc.select_first(doc.root(), |el| el.id() == Some(id))
}

/// The focused element, or else the active tab of the first widget that has one.
fn focused_or_active_tab(host: &TabsHost) -> Option<NodeId> {
    let doc = host.document();
    if let Some(focused) = doc.active_element() {
        return Some(focused);
    }
    host.widget_ids()
        .into_iter()
        .filter_map(|widget| host.view(widget)?.active_tab)
        .find_map(|id| element_by_id(doc, &id))
}
