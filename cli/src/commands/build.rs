use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use thiserror::Error;

use classgraph_core::{Builder, ClassNodeFactory, GraphView, PackageNodeFactory, ScanError, SizeProperty};

use crate::writers;
use crate::{Format, Mode, Size};

/// A CLI usage error (spec §6: exit code 1), as opposed to a processing
/// error (archive corruption, decode failure — exit code 2).
#[derive(Debug, Error)]
#[error("{0}")]
pub(crate) struct UsageError(pub(crate) String);

pub(crate) fn command_build(
    roots: &[PathBuf],
    mode: Mode,
    size: Size,
    format: Format,
    output: Option<&Path>,
) -> Result<()> {
    let size_property = match size {
        Size::Total => SizeProperty::Total,
        Size::Code => SizeProperty::Code,
    };

    let builder = match mode {
        Mode::Package => Builder::new(PackageNodeFactory::new(size_property)),
        Mode::Class => Builder::new(ClassNodeFactory::new(size_property)),
    };

    for root in roots {
        match builder.append(root) {
            Ok(count) => log::info!("{}: {} class files processed", root.display(), count),
            Err(ScanError::RootNotFound(path)) => {
                return Err(UsageError(format!("root path does not exist: {}", path.display())).into());
            }
            Err(ScanError::UnsupportedRoot(path)) => {
                return Err(UsageError(format!(
                    "root path is neither a file nor a directory: {}",
                    path.display()
                ))
                .into());
            }
            Err(err) => return Err(err).with_context(|| format!("failed scanning {}", root.display())),
        }
    }

    let model = builder.model();
    model.create_external_nodes();
    let view = GraphView::from_model(model);

    let rendered = match format {
        Format::Dot => writers::dot::render(&view),
        Format::Gml => writers::gml::render(&view),
        Format::Graphml => writers::graphml::render(&view)?,
    };

    match output {
        Some(path) => fs::write(path, rendered).with_context(|| format!("can't write output file {:?}", path))?,
        None => println!("{rendered}"),
    }

    Ok(())
}
