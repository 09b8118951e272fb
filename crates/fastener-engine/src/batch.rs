//! Parallel builds of independent parameter sets, one kernel per job.

use fastener_types::BoltParameters;
use rayon::prelude::*;
use shape_ops::KernelBundle;
use tracing::{info, info_span, warn};

use crate::bolt::build_bolt;
use crate::nut::build_nut;
use crate::types::{Assembly, BuildError, BuildOptions};

/// Build the bolt, and the nut when `params.nut.generate` is set.
///
/// Bolt and nut parameters are both validated before any geometry is built.
/// A nut failure fails the whole assembly; the bolt is released first.
pub fn build_assembly(
    kb: &mut dyn KernelBundle,
    params: &BoltParameters,
    options: &BuildOptions,
) -> Result<Assembly, BuildError> {
    params.validate()?;
    let bolt = build_bolt(kb, params, options)?;
    let nut = if params.nut.generate {
        match build_nut(kb, params, options) {
            Ok(nut) => Some(nut),
            Err(e) => {
                kb.release(bolt.solid);
                return Err(e);
            }
        }
    } else {
        None
    };
    Ok(Assembly { bolt, nut })
}

/// Result of one batch job, in input order.
#[derive(Debug)]
pub struct BatchItem<R> {
    pub index: usize,
    pub result: Result<R, BuildError>,
}

/// Build every parameter set in parallel.
///
/// Each job gets a fresh kernel from `make_kernel`; `finish` receives that
/// kernel together with the built assembly, typically to export it. A failed
/// job does not affect the others.
pub fn run_batch<K, M, F, R>(
    jobs: &[BoltParameters],
    options: &BuildOptions,
    make_kernel: M,
    finish: F,
) -> Vec<BatchItem<R>>
where
    K: KernelBundle,
    M: Fn() -> K + Sync,
    F: Fn(usize, &mut K, Assembly) -> R + Sync,
    R: Send,
{
    info!(jobs = jobs.len(), "starting batch");
    let items: Vec<BatchItem<R>> = jobs
        .par_iter()
        .enumerate()
        .map(|(index, params)| {
            let _span = info_span!("batch_job", index).entered();
            let mut kernel = make_kernel();
            let result = build_assembly(&mut kernel, params, options)
                .map(|assembly| finish(index, &mut kernel, assembly));
            if let Err(e) = &result {
                warn!(index, error = %e, "batch job failed");
            }
            BatchItem { index, result }
        })
        .collect();

    let failed = items.iter().filter(|item| item.result.is_err()).count();
    info!(jobs = items.len(), failed, "batch finished");
    items
}
