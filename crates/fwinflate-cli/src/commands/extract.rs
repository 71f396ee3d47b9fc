//! Extract command implementation.

use crate::cli::ExtractArgs;
use crate::error::convert_extraction_error;
use crate::output::OutputFormatter;
use crate::progress::CliProgress;
use anyhow::Context;
use anyhow::Result;
use anyhow::anyhow;
use fwinflate_core::ExtractionConfig;
use fwinflate_core::ExtractionObserver;
use fwinflate_core::ExtractionReport;
use fwinflate_core::Extractor;
use fwinflate_core::config::default_destination;
use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;
use tracing::debug;

type Delivered = Rc<RefCell<Option<Result<ExtractionReport>>>>;

pub fn execute(
    args: &ExtractArgs,
    formatter: &dyn OutputFormatter,
    show_progress: bool,
) -> Result<()> {
    let output_dir = args.output_dir.clone().unwrap_or_else(default_destination);

    let config = ExtractionConfig::default()
        .with_max_path_depth(usize::from(args.max_path_depth))
        .with_preserve_permissions(args.preserve_permissions)
        .with_staged(args.staged);

    if !args.staged && has_entries(&output_dir) {
        formatter.format_warning(&format!(
            "'{}' is not empty; files with the same names will be replaced",
            output_dir.display()
        ));
    }

    let delivered: Delivered = Rc::default();
    let observer = Rc::new(
        ExtractionObserver::new()
            .on_finished({
                let delivered = Rc::clone(&delivered);
                move |_, report| {
                    *delivered.borrow_mut() = Some(Ok(report.clone()));
                }
            })
            .on_failed({
                let delivered = Rc::clone(&delivered);
                move |extractor, error| {
                    let converted = convert_extraction_error(error, extractor.archive_path());
                    *delivered.borrow_mut() = Some(Err(converted));
                }
            }),
    );

    let mut extractor = Extractor::new(&args.archive, &output_dir).with_config(config);
    // Use progress bar if TTY is detected (not quiet, not JSON, is terminal)
    if show_progress && CliProgress::should_show() {
        extractor = extractor.with_progress(CliProgress::new("Extracting"));
    }
    extractor.set_observer(Some(&observer));

    extractor
        .begin_extraction()
        .context("failed to start extraction")?;
    let state = extractor.wait();
    debug!(%state, "extraction settled");

    let outcome = delivered
        .borrow_mut()
        .take()
        .ok_or_else(|| anyhow!("extraction ended without reporting a result"))?;
    let report = outcome?;

    formatter.format_extraction_result(&output_dir, &report)
}

fn has_entries(dir: &Path) -> bool {
    std::fs::read_dir(dir).is_ok_and(|mut entries| entries.next().is_some())
}
