//! Drive an editor session from the command line.
//!
//! Usage: edit_session [ve|ignition|boost|generic] [width] [height]
//!
//! Builds a demo table, runs a few keyboard edits and prints the result as
//! CSV. Set `RUST_LOG=vetune_core=debug` to watch each operation.

use std::env;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;
use vetune_core::prelude::*;

fn parse_kind(name: &str) -> Result<TableKind> {
    match name {
        "ve" => Ok(TableKind::Ve),
        "ignition" => Ok(TableKind::Ignition),
        "boost" => Ok(TableKind::Boost),
        "generic" => Ok(TableKind::Generic),
        other => anyhow::bail!("unknown table kind '{}'", other),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().collect();
    let kind = parse_kind(args.get(1).map(String::as_str).unwrap_or("ve"))?;
    let width: usize = args
        .get(2)
        .map(|s| s.parse())
        .transpose()
        .context("width must be a number")?
        .unwrap_or(8);
    let height: usize = args
        .get(3)
        .map(|s| s.parse())
        .transpose()
        .context("height must be a number")?
        .unwrap_or(8);

    let settings = match EditorSettings::default_path() {
        Ok(path) => EditorSettings::load(&path)
            .with_context(|| format!("reading {}", path.display()))?,
        Err(_) => EditorSettings::default(),
    };

    let table = Table::with_demo_data(kind, width, height)?;
    let mut session = EditorSession::with_settings(table, settings);
    session.set_table_focused(true);
    session.subscribe(|change| {
        tracing::info!(
            "table changed: {:?} region {:?} rev {}",
            change.operation.map(|op| op.name()),
            change.region,
            change.revision
        );
    });

    println!(
        "{} {}x{} ({})",
        session.table().metadata.display_name,
        width,
        height,
        session.table().metadata.units
    );

    // Grow a 3x3 selection from the top-left corner and smooth it
    session.click(0, 0);
    for key in [Key::Right, Key::Right, Key::Down, Key::Down] {
        session.handle_key(key, Modifiers::SHIFT);
    }
    for key in [Key::Char('s'), Key::Char('h'), Key::Char('c')] {
        let modifiers = if key == Key::Char('c') {
            Modifiers::CTRL
        } else {
            Modifiers::NONE
        };
        println!("{:?} -> {:?}", key, session.handle_key(key, modifiers));
    }

    // Paste the block at the opposite corner
    session.click(width.saturating_sub(3), height.saturating_sub(3));
    let pasted = session.apply(TableOperation::Paste, OperationArgs::none())?;
    println!("pasted {} cells", pasted.len());

    let (lo, hi) = session.table().data_range();
    println!("range {:.2}..{:.2}, {} undo step(s)", lo, hi, session.history().undo_len());
    print!("{}", session.export_csv());

    Ok(())
}
