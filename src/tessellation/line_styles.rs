use crate::error::{Result, TessellationError};

/// Shape drawn at the open ends of a stroked subpath.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LineCap {
    /// Ends flush with the endpoint.
    #[default]
    Butt,
    /// Semicircle of half the line width.
    Round,
    /// Extends past the endpoint by half the line width.
    Square,
}

/// Shape drawn on the outside of a corner between two segments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LineJoin {
    /// Sharp corner, limited by the miter limit.
    #[default]
    Miter,
    /// Circular arc around the vertex.
    Round,
    /// Straight cut across the corner.
    Bevel,
}

/// Stroke parameters.
///
/// Defaults follow the canvas: width 1, butt caps, miter joins, miter
/// limit 10, no dash.
#[derive(Debug, Clone, PartialEq)]
pub struct LineStyles {
    line_width: f64,
    line_cap: LineCap,
    line_join: LineJoin,
    miter_limit: f64,
    line_dash: Vec<f64>,
    line_dash_offset: f64,
}

impl Default for LineStyles {
    fn default() -> Self {
        Self {
            line_width: 1.0,
            line_cap: LineCap::default(),
            line_join: LineJoin::default(),
            miter_limit: 10.0,
            line_dash: Vec::new(),
            line_dash_offset: 0.0,
        }
    }
}

impl LineStyles {
    /// Creates line styles with the given width and default everything else.
    ///
    /// # Errors
    ///
    /// Returns an error if `line_width` is not positive and finite.
    pub fn new(line_width: f64) -> Result<Self> {
        if !(line_width > 0.0 && line_width.is_finite()) {
            return Err(TessellationError::InvalidParameters(format!(
                "line width must be positive, got {line_width}"
            ))
            .into());
        }
        Ok(Self {
            line_width,
            ..Self::default()
        })
    }

    #[must_use]
    pub fn with_cap(mut self, line_cap: LineCap) -> Self {
        self.line_cap = line_cap;
        self
    }

    #[must_use]
    pub fn with_join(mut self, line_join: LineJoin) -> Self {
        self.line_join = line_join;
        self
    }

    /// Sets the miter limit.
    ///
    /// # Errors
    ///
    /// Returns an error if `miter_limit` is not positive.
    pub fn with_miter_limit(mut self, miter_limit: f64) -> Result<Self> {
        if !(miter_limit > 0.0) {
            return Err(TessellationError::InvalidParameters(format!(
                "miter limit must be positive, got {miter_limit}"
            ))
            .into());
        }
        self.miter_limit = miter_limit;
        Ok(self)
    }

    /// Sets the dash pattern used by [`Shape::dashed`](crate::geometry::Shape::dashed).
    ///
    /// # Errors
    ///
    /// Returns an error if any dash length is negative or not finite.
    pub fn with_dash(mut self, line_dash: Vec<f64>, line_dash_offset: f64) -> Result<Self> {
        validate_dash(&line_dash, line_dash_offset)?;
        self.line_dash = line_dash;
        self.line_dash_offset = line_dash_offset;
        Ok(self)
    }

    #[must_use]
    pub fn line_width(&self) -> f64 {
        self.line_width
    }

    /// Half the line width: the offset distance of each stroke side.
    #[must_use]
    pub fn half_width(&self) -> f64 {
        self.line_width * 0.5
    }

    #[must_use]
    pub fn line_cap(&self) -> LineCap {
        self.line_cap
    }

    #[must_use]
    pub fn line_join(&self) -> LineJoin {
        self.line_join
    }

    #[must_use]
    pub fn miter_limit(&self) -> f64 {
        self.miter_limit
    }

    #[must_use]
    pub fn line_dash(&self) -> &[f64] {
        &self.line_dash
    }

    #[must_use]
    pub fn line_dash_offset(&self) -> f64 {
        self.line_dash_offset
    }

    /// Whether the dash pattern turns the line on and off at all.
    #[must_use]
    pub fn has_line_dash(&self) -> bool {
        self.line_dash.iter().any(|length| *length > 0.0)
    }
}

pub(crate) fn validate_dash(line_dash: &[f64], line_dash_offset: f64) -> Result<()> {
    if let Some(bad) = line_dash
        .iter()
        .find(|length| !(length.is_finite() && **length >= 0.0))
    {
        return Err(TessellationError::InvalidParameters(format!(
            "dash lengths must be finite and non-negative, got {bad}"
        ))
        .into());
    }
    if !line_dash_offset.is_finite() {
        return Err(TessellationError::InvalidParameters(format!(
            "dash offset must be finite, got {line_dash_offset}"
        ))
        .into());
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn canvas_defaults() {
        let styles = LineStyles::default();
        assert!((styles.line_width() - 1.0).abs() < f64::EPSILON);
        assert_eq!(styles.line_cap(), LineCap::Butt);
        assert_eq!(styles.line_join(), LineJoin::Miter);
        assert!((styles.miter_limit() - 10.0).abs() < f64::EPSILON);
        assert!(!styles.has_line_dash());
    }

    #[test]
    fn new_with_valid_width() {
        let styles = LineStyles::new(2.0).unwrap();
        assert!((styles.line_width() - 2.0).abs() < f64::EPSILON);
        assert!((styles.half_width() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn new_with_zero_width_fails() {
        assert!(LineStyles::new(0.0).is_err());
        assert!(LineStyles::new(-1.0).is_err());
        assert!(LineStyles::new(f64::NAN).is_err());
    }

    #[test]
    fn miter_limit_must_be_positive() {
        assert!(LineStyles::default().with_miter_limit(0.0).is_err());
        let styles = LineStyles::default().with_miter_limit(4.0).unwrap();
        assert!((styles.miter_limit() - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn dash_is_validated() {
        assert!(LineStyles::default()
            .with_dash(vec![1.0, -2.0], 0.0)
            .is_err());
        assert!(LineStyles::default()
            .with_dash(vec![1.0, 2.0], f64::INFINITY)
            .is_err());
        let styles = LineStyles::default()
            .with_cap(LineCap::Round)
            .with_join(LineJoin::Bevel)
            .with_dash(vec![3.0, 1.0], 0.5)
            .unwrap();
        assert!(styles.has_line_dash());
        assert_eq!(styles.line_dash(), &[3.0, 1.0]);
        assert_eq!(styles.line_cap(), LineCap::Round);
        assert_eq!(styles.line_join(), LineJoin::Bevel);
    }
}
