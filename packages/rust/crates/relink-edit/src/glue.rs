//! Thread-private layout glue generator.
//!
//! Emits a source file that lets the host application discover, at runtime,
//! where each thread's copy of every shared COMMON block lives and how large
//! it is. Only blocks declared in declaration-only units are described: the
//! glue INCLUDEs those units, which puts the blocks' sentinels in scope.
//!
//! - `THREAD_NUM<suffix>()` - current thread index (always 0 without OpenMP)
//! - `XNUMCOMMONS<suffix>(N)` - number of shared blocks
//! - `XDEFCOMMONS<suffix>(Q0, L, N, NTH)` - per-thread base addresses in `Q0`
//!   (captured inside a parallel region, one slot per thread and block) and
//!   block sizes in `L` (computed once, outside it)

use std::fmt::Write as _;

use crate::privatize::{CommonRegistry, end_sentinel, start_sentinel};
use crate::types::RelinkConfig;

/// Generator for one run's glue source.
#[derive(Debug, Clone)]
pub struct GlueGenerator<'a> {
    registry: &'a CommonRegistry,
    suffix: &'a str,
    commons_marker: &'a str,
    parallel: bool,
}

/// Source of the thread index function.
#[must_use]
pub fn thread_num_function(suffix: &str, parallel: bool) -> String {
    let name = format!("THREAD_NUM{suffix}");
    let body = if parallel {
        format!("      INTEGER OMP_GET_THREAD_NUM\n      {name} = OMP_GET_THREAD_NUM()\n")
    } else {
        format!("      {name} = 0\n")
    };
    format!("      INTEGER FUNCTION {name}()\n{body}      END FUNCTION {name}\n")
}

impl<'a> GlueGenerator<'a> {
    /// Create a generator. `parallel` selects the OpenMP thread index query
    /// instead of the single-thread stub.
    #[must_use]
    pub fn new(registry: &'a CommonRegistry, config: &'a RelinkConfig, parallel: bool) -> Self {
        Self {
            registry,
            suffix: &config.suffix,
            commons_marker: &config.commons_marker,
            parallel,
        }
    }

    /// Number of blocks the glue describes.
    #[must_use]
    pub fn block_count(&self) -> usize {
        self.registry.shared_block_count()
    }

    /// Render the complete glue source.
    #[must_use]
    pub fn render(&self) -> String {
        let suffix = self.suffix;
        let thread_num = format!("THREAD_NUM{suffix}");
        let num_commons = format!("XNUMCOMMONS{suffix}");
        let def_commons = format!("XDEFCOMMONS{suffix}");

        let mut s = String::from("\n");
        s.push_str(&thread_num_function(suffix, self.parallel));
        s.push('\n');

        let _ = write!(
            s,
            "      SUBROUTINE {num_commons}(N)\n      INTEGER N\n      N = {}\n      END SUBROUTINE {num_commons}\n\n",
            self.block_count()
        );

        let _ = writeln!(s, "      SUBROUTINE {def_commons}(Q0, L, N, NTH)");
        for directive in self.registry.include_directives(self.commons_marker) {
            s.push_str(&directive);
            s.push('\n');
        }
        s.push_str("      INTEGER N, NTH\n");
        s.push_str("      INTEGER*8 L(N), Q0(N*NTH)\n");
        let _ = writeln!(s, "      INTEGER {thread_num}");

        s.push_str("\nC$OMP PARALLEL SHARED(Q0, L)\n");
        for (index, block) in self.registry.shared_blocks().enumerate() {
            let _ = writeln!(
                s,
                "      Q0({thread_num}()+1 + NTH*{index}) = LOC({})",
                start_sentinel(block)
            );
        }
        s.push_str("C$OMP END PARALLEL\n\n");

        for (index, block) in self.registry.shared_blocks().enumerate() {
            let _ = writeln!(
                s,
                "      L({}) = LOC({}) - Q0(1 + NTH*{index})",
                index + 1,
                end_sentinel(block)
            );
        }

        let _ = writeln!(s, "\n      END SUBROUTINE {def_commons}");
        s
    }
}
