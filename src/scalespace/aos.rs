use crate::core::Image;
use crate::imgproc::for_each_row_mut;
use num_traits::Float;

/// Direct O(n) solve of a tridiagonal system by the Thomas algorithm.
///
/// `lower[i]` multiplies `x[i-1]` (entry 0 unused), `upper[i]` multiplies
/// `x[i+1]` (last entry unused). All slices share the length of `diag`.
/// The diffusion systems built here are strictly diagonally dominant, so
/// no pivoting is needed.
pub(crate) fn thomas<T: Float>(
    lower: &[T],
    diag: &[T],
    upper: &[T],
    rhs: &[T],
    x: &mut [T],
    scratch: &mut [T],
) {
    let n = diag.len();
    debug_assert!(n > 0);
    debug_assert_eq!(lower.len(), n);
    debug_assert_eq!(upper.len(), n);
    debug_assert_eq!(rhs.len(), n);
    debug_assert_eq!(x.len(), n);
    debug_assert_eq!(scratch.len(), n);

    // Forward sweep
    scratch[0] = upper[0] / diag[0];
    x[0] = rhs[0] / diag[0];
    for i in 1..n {
        let m = diag[i] - lower[i] * scratch[i - 1];
        scratch[i] = upper[i] / m;
        x[i] = (rhs[i] - lower[i] * x[i - 1]) / m;
    }

    // Back substitution
    for i in (0..n - 1).rev() {
        x[i] = x[i] - scratch[i] * x[i + 1];
    }
}

/// Solve one 1-D implicit diffusion line.
///
/// `c` holds the conductance along the line, `u` the previous state. The
/// system is `(I - dt * A) out = u` with off-diagonals `-dt * (c_j + c_j1)`
/// and a main diagonal that cancels them exactly, which gives zero flux
/// through the line ends and preserves the line sum.
fn solve_line(c: &[f32], u: &[f32], dt: f32, out: &mut [f32]) {
    let n = c.len();
    if n == 1 {
        out[0] = u[0];
        return;
    }

    let mut lower = vec![0.0f32; n];
    let mut diag = vec![0.0f32; n];
    let mut upper = vec![0.0f32; n];
    let mut scratch = vec![0.0f32; n];

    for j in 0..n {
        let sub = if j > 0 { -dt * (c[j - 1] + c[j]) } else { 0.0 };
        let sup = if j + 1 < n { -dt * (c[j] + c[j + 1]) } else { 0.0 };
        lower[j] = sub;
        upper[j] = sup;
        diag[j] = 1.0 - sub - sup;
    }

    thomas(&lower, &diag, &upper, u, out, &mut scratch);
}

fn transpose(src: &Image, dst: &mut Image) {
    debug_assert_eq!(src.width(), dst.height());
    debug_assert_eq!(src.height(), dst.width());

    let src_width = src.width();
    for_each_row_mut(dst, |x, dst_row| {
        for (y, out) in dst_row.iter_mut().enumerate() {
            *out = src.data()[y * src_width + x];
        }
    });
}

/// Additive Operator Splitting step for one evolution increment.
///
/// Applies `(I - dt A_x)^-1` along rows and `(I - dt A_y)^-1` along
/// columns independently and averages the two solutions. Row and column
/// sweeps are parallel across lines. Scratch buffers are sized once at
/// construction and reused for every level.
pub struct AosSolver {
    row_solution: Image,
    flow_t: Image,
    prev_t: Image,
    col_solution_t: Image,
}

impl AosSolver {
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            row_solution: Image::new(width, height),
            flow_t: Image::new(height, width),
            prev_t: Image::new(height, width),
            col_solution_t: Image::new(height, width),
        }
    }

    /// Advance `prev` by `dt` under conductance `flow`, writing into `dst`.
    ///
    /// Non-finite results are replaced by the previous-level value, so a
    /// degenerate pixel never propagates.
    pub fn step(&mut self, dst: &mut Image, prev: &Image, flow: &Image, dt: f32) {
        let width = prev.width();
        let height = prev.height();
        if width == 0 || height == 0 {
            return;
        }

        // Row sweep
        for_each_row_mut(&mut self.row_solution, |y, out_row| {
            solve_line(flow.row(y), prev.row(y), dt, out_row);
        });

        // Column sweep on transposed buffers, so each column is contiguous
        transpose(flow, &mut self.flow_t);
        transpose(prev, &mut self.prev_t);
        for_each_row_mut(&mut self.col_solution_t, |x, out_col| {
            solve_line(self.flow_t.row(x), self.prev_t.row(x), dt, out_col);
        });

        let rows = &self.row_solution;
        let cols_t = &self.col_solution_t;
        for_each_row_mut(dst, |y, dst_row| {
            let row_sol = rows.row(y);
            for x in 0..width {
                let v = 0.5 * (row_sol[x] + cols_t.data()[x * height + y]);
                dst_row[x] = if v.is_finite() { v } else { prev.row(y)[x] };
            }
        });
    }
}
