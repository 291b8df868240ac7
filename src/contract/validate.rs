use crate::contract::message::{
    Bounds, CalibrationStatus, CameraOffset, CelestialKind, CelestialObject, CommandKind,
    DPR_BOUNDS, EXTENT_BOUNDS, LINE_LENGTH_BOUNDS, MAGNITUDE_BOUNDS, ROTATION_SPEED_BOUNDS,
    RenderCommand, ZOOM_BOUNDS,
};
use serde_json::{Map, Value};
use smallvec::SmallVec;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PathElem {
    Field(&'static str),
    Index(usize),
}

fn format_path(path: &[PathElem]) -> String {
    let mut s = String::from("$");
    for p in path {
        match *p {
            PathElem::Field(name) => {
                s.push('.');
                s.push_str(name);
            }
            PathElem::Index(i) => {
                s.push('[');
                s.push_str(&i.to_string());
                s.push(']');
            }
        }
    }
    s
}

/// One broken rule: where, and what was expected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// JSONPath-like location, e.g. `$.celestialObjects[2].magnitude`.
    pub path: String,
    /// Human-readable constraint, e.g. `must be <= 5000`.
    pub constraint: String,
}

impl Violation {
    /// Build a violation at `path`.
    pub fn new(path: impl Into<String>, constraint: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            constraint: constraint.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.constraint)
    }
}

/// Every violation found in one payload, in field order. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    violations: SmallVec<[Violation; 2]>,
}

impl ValidationError {
    /// Wrap a single violation.
    pub fn single(v: Violation) -> Self {
        let mut violations = SmallVec::new();
        violations.push(v);
        Self { violations }
    }

    /// All violations.
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Return `true` when some violation sits exactly at `path`.
    pub fn names(&self, path: &str) -> bool {
        self.violations.iter().any(|v| v.path == path)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.violations.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{v}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// Parse JSON text and validate it.
pub fn parse_command(text: &str) -> Result<RenderCommand, ValidationError> {
    let raw: Value = serde_json::from_str(text).map_err(|e| {
        ValidationError::single(Violation::new("$", format!("invalid JSON: {e}")))
    })?;
    validate(&raw)
}

/// Check an untyped payload against the message contract.
///
/// Pure: either every field is well-formed and in bounds and a command is returned, or all
/// offending fields are reported. Unknown fields are ignored.
pub fn validate(raw: &Value) -> Result<RenderCommand, ValidationError> {
    let Some(obj) = raw.as_object() else {
        return Err(ValidationError::single(Violation::new(
            "$",
            format!("expected an object, received {}", type_name(raw)),
        )));
    };

    let mut ck = Checker::default();
    let root: &[PathElem] = &[];

    let kind = ck.tag(
        obj,
        root,
        "type",
        &[("render", CommandKind::Render), ("animate", CommandKind::Animate)],
    );
    let width = ck.integer_in(obj, root, "width", EXTENT_BOUNDS);
    let height = ck.integer_in(obj, root, "height", EXTENT_BOUNDS);
    let dpr = ck.number_in(obj, root, "dpr", DPR_BOUNDS);
    let offset = ck.object(obj, root, "offset").and_then(|o| {
        let base = [PathElem::Field("offset")];
        let x = ck.number(o, &base, "x");
        let y = ck.number(o, &base, "y");
        Some(CameraOffset { x: x?, y: y? })
    });
    let zoom = ck.number_in(obj, root, "zoomLevel", ZOOM_BOUNDS);
    let speed = ck.number_in(obj, root, "rotationSpeed", ROTATION_SPEED_BOUNDS);
    let auto_rotate = ck.boolean(obj, root, "autoRotate");
    let show_grid = ck.boolean(obj, root, "showGrid");
    let line_length = ck.number_in(obj, root, "lineLength", LINE_LENGTH_BOUNDS);
    let objects = ck
        .array(obj, root, "celestialObjects")
        .and_then(|items| ck.celestial_objects(items));
    let status = ck.tag(
        obj,
        root,
        "calibrationStatus",
        &[
            ("idle", CalibrationStatus::Idle),
            ("calibrating", CalibrationStatus::Calibrating),
            ("error", CalibrationStatus::Error),
        ],
    );

    let (
        Some(kind),
        Some(width),
        Some(height),
        Some(device_pixel_ratio),
        Some(camera_offset),
        Some(zoom_level),
        Some(rotation_speed),
        Some(auto_rotate),
        Some(show_grid),
        Some(calibration_vector_length),
        Some(celestial_objects),
        Some(calibration_status),
    ) = (
        kind,
        width,
        height,
        dpr,
        offset,
        zoom,
        speed,
        auto_rotate,
        show_grid,
        line_length,
        objects,
        status,
    )
    else {
        return Err(ck.finish());
    };

    if !ck.violations.is_empty() {
        return Err(ck.finish());
    }

    Ok(RenderCommand {
        kind,
        width,
        height,
        device_pixel_ratio,
        camera_offset,
        zoom_level,
        rotation_speed,
        auto_rotate,
        show_grid,
        calibration_vector_length,
        celestial_objects,
        calibration_status,
    })
}

fn type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[derive(Default)]
struct Checker {
    violations: SmallVec<[Violation; 2]>,
}

impl Checker {
    fn push(&mut self, base: &[PathElem], name: &'static str, constraint: impl Into<String>) {
        let mut path = base.to_vec();
        path.push(PathElem::Field(name));
        self.violations
            .push(Violation::new(format_path(&path), constraint));
    }

    fn finish(self) -> ValidationError {
        debug_assert!(!self.violations.is_empty());
        ValidationError {
            violations: self.violations,
        }
    }

    fn required<'v>(
        &mut self,
        obj: &'v Map<String, Value>,
        base: &[PathElem],
        name: &'static str,
    ) -> Option<&'v Value> {
        let v = obj.get(name);
        if v.is_none() {
            self.push(base, name, "is required");
        }
        v
    }

    fn expected(&mut self, base: &[PathElem], name: &'static str, what: &str, got: &Value) {
        self.push(
            base,
            name,
            format!("expected {what}, received {}", type_name(got)),
        );
    }

    fn number(
        &mut self,
        obj: &Map<String, Value>,
        base: &[PathElem],
        name: &'static str,
    ) -> Option<f64> {
        let v = self.required(obj, base, name)?;
        match v.as_f64() {
            Some(n) if n.is_finite() => Some(n),
            Some(_) => {
                self.push(base, name, "must be finite");
                None
            }
            None => {
                self.expected(base, name, "a number", v);
                None
            }
        }
    }

    fn number_in(
        &mut self,
        obj: &Map<String, Value>,
        base: &[PathElem],
        name: &'static str,
        bounds: Bounds<f64>,
    ) -> Option<f64> {
        let n = self.number(obj, base, name)?;
        if n < bounds.min {
            self.push(base, name, format!("must be >= {}", bounds.min));
            return None;
        }
        if n > bounds.max {
            self.push(base, name, format!("must be <= {}", bounds.max));
            return None;
        }
        Some(n)
    }

    fn integer_in(
        &mut self,
        obj: &Map<String, Value>,
        base: &[PathElem],
        name: &'static str,
        bounds: Bounds<u32>,
    ) -> Option<u32> {
        let n = self.number(obj, base, name)?;
        if n.fract() != 0.0 {
            self.push(base, name, "expected an integer");
            return None;
        }
        if n < f64::from(bounds.min) {
            self.push(base, name, format!("must be >= {}", bounds.min));
            return None;
        }
        if n > f64::from(bounds.max) {
            self.push(base, name, format!("must be <= {}", bounds.max));
            return None;
        }
        Some(n as u32)
    }

    fn boolean(
        &mut self,
        obj: &Map<String, Value>,
        base: &[PathElem],
        name: &'static str,
    ) -> Option<bool> {
        let v = self.required(obj, base, name)?;
        let b = v.as_bool();
        if b.is_none() {
            self.expected(base, name, "a boolean", v);
        }
        b
    }

    fn tag<T: Copy>(
        &mut self,
        obj: &Map<String, Value>,
        base: &[PathElem],
        name: &'static str,
        tags: &[(&'static str, T)],
    ) -> Option<T> {
        let v = self.required(obj, base, name)?;
        let Some(s) = v.as_str() else {
            self.expected(base, name, "a string", v);
            return None;
        };
        if let Some(&(_, t)) = tags.iter().find(|(tag, _)| *tag == s) {
            return Some(t);
        }
        let allowed: Vec<String> = tags.iter().map(|(tag, _)| format!("\"{tag}\"")).collect();
        self.push(
            base,
            name,
            format!("must be one of {}, received \"{s}\"", allowed.join(" | ")),
        );
        None
    }

    fn object<'v>(
        &mut self,
        obj: &'v Map<String, Value>,
        base: &[PathElem],
        name: &'static str,
    ) -> Option<&'v Map<String, Value>> {
        let v = self.required(obj, base, name)?;
        let o = v.as_object();
        if o.is_none() {
            self.expected(base, name, "an object", v);
        }
        o
    }

    fn array<'v>(
        &mut self,
        obj: &'v Map<String, Value>,
        base: &[PathElem],
        name: &'static str,
    ) -> Option<&'v Vec<Value>> {
        let v = self.required(obj, base, name)?;
        let a = v.as_array();
        if a.is_none() {
            self.expected(base, name, "an array", v);
        }
        a
    }

    fn celestial_objects(&mut self, items: &[Value]) -> Option<Vec<CelestialObject>> {
        let mut out = Vec::with_capacity(items.len());
        let mut ok = true;
        for (i, item) in items.iter().enumerate() {
            let base = [PathElem::Field("celestialObjects"), PathElem::Index(i)];
            let Some(o) = item.as_object() else {
                self.violations.push(Violation::new(
                    format_path(&base),
                    format!("expected an object, received {}", type_name(item)),
                ));
                ok = false;
                continue;
            };
            let kind = self.tag(
                o,
                &base,
                "type",
                &[
                    ("star", CelestialKind::Star),
                    ("nebula", CelestialKind::Nebula),
                    ("galaxy", CelestialKind::Galaxy),
                ],
            );
            let x = self.number(o, &base, "x");
            let y = self.number(o, &base, "y");
            let magnitude = self.number_in(o, &base, "magnitude", MAGNITUDE_BOUNDS);
            match (kind, x, y, magnitude) {
                (Some(kind), Some(x), Some(y), Some(magnitude)) => out.push(CelestialObject {
                    kind,
                    x,
                    y,
                    magnitude,
                }),
                _ => ok = false,
            }
        }
        ok.then_some(out)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/contract/validate.rs"]
mod tests;
