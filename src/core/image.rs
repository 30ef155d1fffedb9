use ndarray::ArrayView2;

/// Single-channel `f32` image with row-major storage.
///
/// All scale space buffers use this container. Pixel values of the pipeline
/// input are expected in `[0, 1]`; intermediate buffers (derivatives,
/// detector responses) are unbounded.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    data: Vec<f32>,
    width: usize,
    height: usize,
}

impl Image {
    /// Create a zero-filled image.
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            data: vec![0.0; width * height],
            width,
            height,
        }
    }

    /// Copy a (possibly strided) 2-D view into an owned row-major image.
    ///
    /// The view is indexed `(row, col)`, i.e. shape `(height, width)`.
    #[must_use]
    pub fn from_view(view: ArrayView2<'_, f32>) -> Self {
        let (height, width) = view.dim();
        let mut data = Vec::with_capacity(width * height);
        for row in view.rows() {
            data.extend(row.iter().copied());
        }
        Self {
            data,
            width,
            height,
        }
    }

    #[inline]
    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Pixel at column `x`, row `y`. Callers are responsible for bounds.
    #[inline]
    #[must_use]
    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.data[y * self.width + x]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: f32) {
        self.data[y * self.width + x] = value;
    }

    #[inline]
    #[must_use]
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    #[inline]
    pub fn data_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    #[inline]
    #[must_use]
    pub fn row(&self, y: usize) -> &[f32] {
        &self.data[y * self.width..(y + 1) * self.width]
    }

    pub fn fill(&mut self, value: f32) {
        self.data.fill(value);
    }

    /// Borrow as an ndarray view of shape `(height, width)`.
    ///
    /// The buffer length always matches the shape, so the fallible ndarray
    /// constructor cannot actually fail; a degenerate empty view is returned
    /// in lieu of panicking.
    #[must_use]
    pub fn view(&self) -> ArrayView2<'_, f32> {
        ArrayView2::from_shape((self.height, self.width), &self.data)
            .unwrap_or_else(|_| ArrayView2::from_shape((0, 0), &[]).unwrap())
    }

    /// Bilinear sample at subpixel coordinates, replicating the border.
    ///
    /// Pixel centers sit at integer coordinates.
    #[must_use]
    pub fn bilinear(&self, x: f32, y: f32) -> f32 {
        if self.data.is_empty() {
            return 0.0;
        }
        let max_x = (self.width - 1) as f32;
        let max_y = (self.height - 1) as f32;
        let x = x.clamp(0.0, max_x);
        let y = y.clamp(0.0, max_y);

        let x0 = x.floor();
        let y0 = y.floor();
        let fx = x - x0;
        let fy = y - y0;

        let x0 = x0 as usize;
        let y0 = y0 as usize;
        let x1 = (x0 + 1).min(self.width - 1);
        let y1 = (y0 + 1).min(self.height - 1);

        let v00 = self.get(x0, y0);
        let v10 = self.get(x1, y0);
        let v01 = self.get(x0, y1);
        let v11 = self.get(x1, y1);

        (1.0 - fx) * (1.0 - fy) * v00 + fx * (1.0 - fy) * v10 + (1.0 - fx) * fy * v01 + fx * fy * v11
    }
}
