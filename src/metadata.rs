//! EXIF metadata extraction.
//!
//! Tags are read once from the encoded source bytes and held as a flat
//! name-to-string map. Rational values keep their `numerator/denominator`
//! form so GPS coordinates can be decoded exactly. Lookups accept raw tag
//! names, an `exif:` prefix, and a handful of friendly aliases (`model`,
//! `iso`, `date_created`, ...).

use serde::Serialize;
use std::collections::HashMap;
use std::io::Cursor;

/// Friendly lookup names and the raw tags they resolve to, in priority order.
const ALIASES: &[(&str, &[&str])] = &[
    ("model", &["Model"]),
    ("make", &["Make"]),
    ("description", &["ImageDescription"]),
    ("date_created", &["DateTimeOriginal", "DateTime"]),
    ("orientation", &["Orientation"]),
    ("exposure", &["ExposureTime"]),
    ("shutter_speed", &["ExposureTime"]),
    ("f", &["FNumber"]),
    ("f_number", &["FNumber"]),
    ("aperture", &["FNumber"]),
    ("iso", &["ISOSpeedRatings", "PhotographicSensitivity"]),
    ("flash", &["Flash"]),
    ("focal_length", &["FocalLength"]),
    ("comment", &["UserComment"]),
];

/// Parsed EXIF tags for one image.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExifData {
    tags: HashMap<String, String>,
}

/// A decoded GPS coordinate, one of the two output shapes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum GpsValue {
    /// Signed decimal degrees; west and south are negative.
    Decimal(f64),
    /// Unsigned degrees/minutes/seconds with overflow carried upward.
    Dms { degrees: f64, minutes: f64, seconds: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GpsPosition {
    pub latitude: GpsValue,
    pub longitude: GpsValue,
}

impl ExifData {
    /// Parse EXIF from encoded image bytes. `None` when the container has no
    /// EXIF segment or it cannot be parsed.
    pub(crate) fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let parsed = exif::Reader::new()
            .read_from_container(&mut Cursor::new(bytes))
            .ok()?;
        let mut tags = HashMap::new();
        for field in parsed.fields() {
            if field.ifd_num != exif::In::PRIMARY {
                continue;
            }
            if let Some(rendered) = render_value(&field.value) {
                tags.entry(field.tag.to_string()).or_insert(rendered);
            }
        }
        if tags.is_empty() { None } else { Some(Self { tags }) }
    }

    #[cfg(test)]
    pub(crate) fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        let tags = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self { tags }
    }

    /// Look up a tag by raw name, `exif:`-prefixed name, or friendly alias.
    pub fn get(&self, name: &str) -> Option<&str> {
        let name = name.strip_prefix("exif:").unwrap_or(name);
        if let Some(v) = self.tags.get(name) {
            return Some(v.as_str());
        }
        let lowered = name.to_ascii_lowercase();
        let (_, candidates) = ALIASES.iter().find(|(alias, _)| *alias == lowered)?;
        candidates
            .iter()
            .find_map(|tag| self.tags.get(*tag))
            .map(String::as_str)
    }

    pub fn tags(&self) -> impl Iterator<Item = (&str, &str)> {
        self.tags.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn orientation(&self) -> Option<u32> {
        self.get("Orientation")?
            .split(|c: char| !c.is_ascii_digit())
            .find(|s| !s.is_empty())?
            .parse()
            .ok()
    }

    /// Reset the stored orientation to upright. Called after the correction
    /// has been applied to pixels, so the tag and the buffer agree.
    pub(crate) fn set_orientation_normal(&mut self) {
        if self.tags.contains_key("Orientation") {
            self.tags.insert("Orientation".to_string(), "1".to_string());
        }
    }

    /// Capture timestamp normalized to `YYYY-MM-DD HH:MM:SS`.
    pub fn date_created(&self) -> Option<String> {
        let raw = self.get("date_created")?.trim();
        // EXIF writes "YYYY:MM:DD HH:MM:SS".
        let (date, time) = raw.split_once(' ')?;
        let d: Vec<&str> = date.split(':').collect();
        let t: Vec<&str> = time.split(':').collect();
        if d.len() != 3 || t.len() != 3 {
            return None;
        }
        if !d.iter().chain(t.iter()).all(|p| p.bytes().all(|b| b.is_ascii_digit())) {
            return None;
        }
        Some(format!("{}-{}-{} {}:{}:{}", d[0], d[1], d[2], t[0], t[1], t[2]))
    }

    /// Decoded GPS position, `None` unless both axes are present.
    pub fn gps(&self, dms: bool) -> Option<GpsPosition> {
        let latitude = decode_coordinate(
            self.get("GPSLatitude")?,
            self.get("GPSLatitudeRef").unwrap_or("N"),
            dms,
        )?;
        let longitude = decode_coordinate(
            self.get("GPSLongitude")?,
            self.get("GPSLongitudeRef").unwrap_or("E"),
            dms,
        )?;
        Some(GpsPosition { latitude, longitude })
    }
}

/// Decode one GPS axis from its rational parts and hemisphere letter.
fn decode_coordinate(parts: &str, hemisphere: &str, dms: bool) -> Option<GpsValue> {
    let mut nums = parts.split(',').map(|p| rational_to_f64(p.trim()));
    let degrees = nums.next()??;
    let minutes = nums.next().flatten().unwrap_or(0.0);
    let seconds = nums.next().flatten().unwrap_or(0.0);

    let total = degrees + minutes / 60.0 + seconds / 3600.0;
    if dms {
        // Re-split so fractional degrees carry into minutes and fractional
        // minutes into seconds.
        let d = total.trunc();
        let rem = (total - d) * 60.0;
        let m = rem.trunc();
        let s = (rem - m) * 60.0;
        Some(GpsValue::Dms { degrees: d, minutes: m, seconds: s })
    } else {
        let sign = match hemisphere.trim() {
            "S" | "s" | "W" | "w" => -1.0,
            _ => 1.0,
        };
        Some(GpsValue::Decimal(sign * total))
    }
}

/// Parse `"N/D"` rationals; plain decimals pass through.
fn rational_to_f64(s: &str) -> Option<f64> {
    match s.split_once('/') {
        Some((num, denom)) => {
            let num: f64 = num.trim().parse().ok()?;
            let denom: f64 = denom.trim().parse().ok()?;
            if denom == 0.0 { None } else { Some(num / denom) }
        }
        None => s.parse().ok(),
    }
}

/// Render a raw EXIF value as a stable string. Rationals keep their `N/D`
/// form; numeric lists join with commas.
fn render_value(value: &exif::Value) -> Option<String> {
    use exif::Value;

    fn join<T: ToString>(items: &[T]) -> Option<String> {
        if items.is_empty() {
            return None;
        }
        Some(
            items
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", "),
        )
    }

    match value {
        Value::Ascii(lines) => {
            let s = lines
                .iter()
                .map(|line| String::from_utf8_lossy(line).trim().to_string())
                .filter(|line| !line.is_empty())
                .collect::<Vec<_>>()
                .join(" ");
            if s.is_empty() { None } else { Some(s) }
        }
        Value::Byte(v) => join(v),
        Value::Short(v) => join(v),
        Value::Long(v) => join(v),
        Value::SByte(v) => join(v),
        Value::SShort(v) => join(v),
        Value::SLong(v) => join(v),
        Value::Float(v) => join(v),
        Value::Double(v) => join(v),
        Value::Rational(v) => {
            let parts: Vec<String> =
                v.iter().map(|r| format!("{}/{}", r.num, r.denom)).collect();
            if parts.is_empty() { None } else { Some(parts.join(", ")) }
        }
        Value::SRational(v) => {
            let parts: Vec<String> =
                v.iter().map(|r| format!("{}/{}", r.num, r.denom)).collect();
            if parts.is_empty() { None } else { Some(parts.join(", ")) }
        }
        // UserComment and friends: an 8-byte charset marker, then text.
        Value::Undefined(bytes, _) => {
            let text = match bytes.strip_prefix(b"ASCII\0\0\0") {
                Some(rest) => rest,
                None => bytes.as_slice(),
            };
            let s = String::from_utf8_lossy(text)
                .trim_matches(['\0', ' '])
                .to_string();
            if s.is_empty() { None } else { Some(s) }
        }
        _ => None,
    }
}
