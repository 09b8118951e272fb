use geom_kernel::{Kernel, KernelError, KernelIntrospect, KernelSolidHandle, Transform};

/// Combined trait for operations that need both mutable Kernel access
/// and read-only KernelIntrospect access on the same object, plus the
/// ownership helpers every builder uses.
pub trait KernelBundle: Kernel + KernelIntrospect {
    /// Move a solid. The input handle is given back to the kernel either way.
    fn place(
        &mut self,
        solid: KernelSolidHandle,
        transform: &Transform,
    ) -> Result<KernelSolidHandle, KernelError> {
        let placed = self.transform(&solid, transform);
        self.release(solid);
        placed
    }

    fn release_all(&mut self, solids: Vec<KernelSolidHandle>) {
        for solid in solids {
            self.release(solid);
        }
    }
}

// Blanket implementation for any type that implements both traits
impl<T: Kernel + KernelIntrospect> KernelBundle for T {}
