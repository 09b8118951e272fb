use geom_kernel::KernelSolidHandle;
use tracing::{debug, warn};

use crate::kernel_ext::KernelBundle;
use crate::types::OpError;

/// Boolean operation type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BooleanKind {
    Union,
    Subtract,
}

/// Execute a boolean operation between two solids, returning every disjoint
/// solid of the result. The inputs are left untouched.
pub fn execute_boolean(
    kb: &mut dyn KernelBundle,
    body_a: &KernelSolidHandle,
    body_b: &KernelSolidHandle,
    kind: BooleanKind,
) -> Result<Vec<KernelSolidHandle>, OpError> {
    let solids = match kind {
        BooleanKind::Union => kb.boolean_union(body_a, body_b)?,
        BooleanKind::Subtract => kb.boolean_subtract(body_a, body_b)?,
    };
    debug!(?kind, solids = solids.len(), "boolean");
    Ok(solids)
}

/// Keep the solid with the greatest volume and release the others.
///
/// Ties go to the earliest solid. A solid whose volume cannot be measured
/// never wins. Returns `None` for an empty list.
pub fn select_largest(
    kb: &mut dyn KernelBundle,
    solids: Vec<KernelSolidHandle>,
) -> Option<KernelSolidHandle> {
    if solids.len() > 1 {
        debug!(count = solids.len(), "multiple solids, keeping the largest");
    }
    let volumes: Vec<f64> = solids
        .iter()
        .map(|solid| {
            kb.volume(solid).unwrap_or_else(|e| {
                warn!(handle = solid.raw(), error = %e, "could not measure solid");
                f64::NEG_INFINITY
            })
        })
        .collect();

    let mut best = 0;
    for (i, volume) in volumes.iter().enumerate() {
        if *volume > volumes[best] {
            best = i;
        }
    }

    let mut kept = None;
    let mut losers = Vec::new();
    for (i, solid) in solids.into_iter().enumerate() {
        if i == best {
            kept = Some(solid);
        } else {
            losers.push(solid);
        }
    }
    kb.release_all(losers);
    kept
}

/// Mandatory boolean step: consume both operands, run the operation and keep
/// the largest solid. An empty result is an error naming `operation`.
pub fn boolean_keep_largest(
    kb: &mut dyn KernelBundle,
    body_a: KernelSolidHandle,
    body_b: KernelSolidHandle,
    kind: BooleanKind,
    operation: &str,
) -> Result<KernelSolidHandle, OpError> {
    let result = execute_boolean(kb, &body_a, &body_b, kind);
    kb.release(body_a);
    kb.release(body_b);

    select_largest(kb, result?).ok_or_else(|| OpError::NoSolids {
        operation: operation.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use geom_kernel::{Kernel, KernelIntrospect, MockKernel, MockOpKind, Transform};

    #[test]
    fn test_select_largest_of_disjoint_union() {
        let mut kernel = MockKernel::new();
        let small = kernel.make_box([1.0, 1.0, 1.0]).unwrap();
        let big = kernel.make_box([2.0, 2.0, 2.0]).unwrap();
        let big = kernel
            .place(big, &Transform::translation([10.0, 0.0, 0.0]))
            .unwrap();

        let solids = execute_boolean(&mut kernel, &small, &big, BooleanKind::Union).unwrap();
        assert_eq!(solids.len(), 2);
        kernel.release(small);
        kernel.release(big);

        let kept = select_largest(&mut kernel, solids).unwrap();
        assert_relative_eq!(kernel.volume(&kept).unwrap(), 8.0);
        assert_eq!(kernel.live_solids(), 1);
    }

    #[test]
    fn test_select_largest_order_independent() {
        let mut kernel = MockKernel::new();
        let big = kernel.make_box([3.0, 1.0, 1.0]).unwrap();
        let small = kernel.make_box([1.0, 1.0, 1.0]).unwrap();
        let kept = select_largest(&mut kernel, vec![big, small]).unwrap();
        assert_relative_eq!(kernel.volume(&kept).unwrap(), 3.0);
    }

    #[test]
    fn test_select_largest_empty() {
        let mut kernel = MockKernel::new();
        assert!(select_largest(&mut kernel, Vec::new()).is_none());
    }

    #[test]
    fn test_keep_largest_reports_empty_result() {
        let mut kernel = MockKernel::new();
        let target = kernel.make_box([1.0, 1.0, 1.0]).unwrap();
        let cutter = kernel.make_box([3.0, 3.0, 3.0]).unwrap();
        let cutter = kernel
            .place(cutter, &Transform::translation([-1.0, -1.0, -1.0]))
            .unwrap();

        let err = boolean_keep_largest(&mut kernel, target, cutter, BooleanKind::Subtract, "trim")
            .unwrap_err();
        match err {
            OpError::NoSolids { operation } => assert_eq!(operation, "trim"),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(kernel.live_solids(), 0);
    }

    #[test]
    fn test_keep_largest_propagates_kernel_failure() {
        let mut kernel = MockKernel::new();
        kernel.inject_fault(MockOpKind::Union, 0);
        let a = kernel.make_box([1.0, 1.0, 1.0]).unwrap();
        let b = kernel.make_box([1.0, 1.0, 1.0]).unwrap();
        let err = boolean_keep_largest(&mut kernel, a, b, BooleanKind::Union, "fuse").unwrap_err();
        assert!(matches!(err, OpError::Kernel(_)));
        assert_eq!(kernel.live_solids(), 0);
    }
}
