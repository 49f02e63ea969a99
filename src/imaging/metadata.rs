//! EXIF extraction and normalisation via `kamadak-exif`.
//!
//! Reading works on the raw object bytes, so it is independent of which pixel
//! decoder handled the image. Supported containers are the ones the `exif`
//! crate recognises: JPEG, TIFF, PNG, WebP, HEIF.
//!
//! ## Normalisation
//!
//! Each primary-image field becomes one JSON entry, in the order the tags were
//! read:
//!
//! - **Key**: the tag name (`Make`, `DateTimeOriginal`, `GPSLatitude`, ...),
//!   or the decimal tag number when the tag is not known.
//! - **Value**: ASCII and UNDEFINED data decode as text, replacing invalid
//!   bytes, so a value can never fail the record. Numeric data becomes a JSON
//!   number, or an array when the field holds several. Rationals become
//!   floats (`null` on a zero denominator).
//!
//! Fields of the embedded thumbnail (IFD1) are skipped.

use serde_json::{Map, Number, Value};
use std::io::Cursor;

/// Normalised EXIF document, keyed by tag name.
pub type ExifMap = Map<String, Value>;

/// Why EXIF could not be produced for an image.
#[derive(Debug)]
pub enum ExifAbsence {
    /// The image carries no EXIF block.
    Missing,
    /// An EXIF block exists but could not be parsed.
    Unreadable(String),
}

/// Read and normalise the EXIF block of an encoded image.
pub fn read_exif(bytes: &[u8]) -> Result<ExifMap, ExifAbsence> {
    let exif = exif::Reader::new()
        .read_from_container(&mut Cursor::new(bytes))
        .map_err(|e| match e {
            exif::Error::NotFound(_) => ExifAbsence::Missing,
            other => ExifAbsence::Unreadable(other.to_string()),
        })?;

    Ok(normalize(exif.fields()))
}

/// Convert parsed fields into a JSON document.
pub fn normalize<'a>(fields: impl IntoIterator<Item = &'a exif::Field>) -> ExifMap {
    fields
        .into_iter()
        .filter(|field| field.ifd_num == exif::In::PRIMARY)
        .map(|field| (tag_name(field.tag), value_to_json(&field.value)))
        .collect()
}

fn tag_name(tag: exif::Tag) -> String {
    if tag.description().is_some() {
        tag.to_string()
    } else {
        tag.number().to_string()
    }
}

fn value_to_json(value: &exif::Value) -> Value {
    use exif::Value as V;

    match value {
        V::Ascii(strings) => collapse(
            strings
                .iter()
                .map(|s| Value::String(lossy_text(s)))
                .collect(),
        ),
        V::Undefined(bytes, _) => Value::String(lossy_text(bytes)),
        V::Byte(v) => numbers(v),
        V::Short(v) => numbers(v),
        V::Long(v) => numbers(v),
        V::SByte(v) => numbers(v),
        V::SShort(v) => numbers(v),
        V::SLong(v) => numbers(v),
        V::Rational(v) => collapse(
            v.iter()
                .map(|r| ratio(r.num as f64, r.denom as f64))
                .collect(),
        ),
        V::SRational(v) => collapse(
            v.iter()
                .map(|r| ratio(r.num as f64, r.denom as f64))
                .collect(),
        ),
        V::Float(v) => collapse(v.iter().map(|f| float(*f as f64)).collect()),
        V::Double(v) => collapse(v.iter().map(|f| float(*f)).collect()),
        // `Unknown` holds only the raw type and offset.
        _ => Value::Null,
    }
}

fn numbers<T: Copy + Into<Number>>(values: &[T]) -> Value {
    collapse(values.iter().map(|v| Value::Number((*v).into())).collect())
}

fn ratio(num: f64, denom: f64) -> Value {
    if denom == 0.0 {
        Value::Null
    } else {
        float(num / denom)
    }
}

fn float(value: f64) -> Value {
    Number::from_f64(value).map_or(Value::Null, Value::Number)
}

/// A single value stands alone; several become an array.
fn collapse(mut values: Vec<Value>) -> Value {
    if values.len() == 1 {
        values.remove(0)
    } else {
        Value::Array(values)
    }
}

fn lossy_text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .trim_end_matches('\0')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{jpeg_bytes, jpeg_with_exif, png_rgba_bytes};
    use exif::{Field, In, Tag};

    fn ascii(tag: Tag, text: &str) -> Field {
        Field {
            tag,
            ifd_num: In::PRIMARY,
            value: exif::Value::Ascii(vec![text.as_bytes().to_vec()]),
        }
    }

    #[test]
    fn missing_exif_is_reported_as_missing() {
        assert!(matches!(read_exif(&jpeg_bytes(32, 32)), Err(ExifAbsence::Missing)));
    }

    #[test]
    fn png_without_exif_is_missing() {
        assert!(matches!(read_exif(&png_rgba_bytes(8, 8)), Err(ExifAbsence::Missing)));
    }

    #[test]
    fn garbage_is_not_a_panic() {
        assert!(read_exif(b"garbage bytes").is_err());
    }

    #[test]
    fn reads_named_tags_in_order() {
        let bytes = jpeg_with_exif(
            64,
            48,
            &[ascii(Tag::Make, "Acme"), ascii(Tag::Model, "Pinhole 1")],
        );
        let map = read_exif(&bytes).unwrap();
        assert_eq!(map["Make"], "Acme");
        assert_eq!(map["Model"], "Pinhole 1");

        let keys: Vec<&str> = map.keys().map(String::as_str).collect();
        let make = keys.iter().position(|k| *k == "Make").unwrap();
        let model = keys.iter().position(|k| *k == "Model").unwrap();
        assert!(make < model);
    }

    #[test]
    fn unknown_tag_uses_number() {
        let custom = Field {
            tag: Tag(exif::Context::Tiff, 0xC000),
            ifd_num: In::PRIMARY,
            value: exif::Value::Short(vec![7]),
        };
        let map = normalize([&custom]);
        assert_eq!(map["49152"], 7);
    }

    #[test]
    fn undefined_bytes_decode_with_replacement() {
        let comment = Field {
            tag: Tag::UserComment,
            ifd_num: In::PRIMARY,
            value: exif::Value::Undefined(vec![b'h', b'i', 0xFF], 0),
        };
        let map = normalize([&comment]);
        assert_eq!(map["UserComment"], "hi\u{FFFD}");
    }

    #[test]
    fn ascii_trailing_nuls_trimmed() {
        let make = Field {
            tag: Tag::Make,
            ifd_num: In::PRIMARY,
            value: exif::Value::Ascii(vec![b"Acme\0\0".to_vec()]),
        };
        assert_eq!(normalize([&make])["Make"], "Acme");
    }

    #[test]
    fn numeric_vectors() {
        let single = Field {
            tag: Tag::Orientation,
            ifd_num: In::PRIMARY,
            value: exif::Value::Short(vec![6]),
        };
        let many = Field {
            tag: Tag::BitsPerSample,
            ifd_num: In::PRIMARY,
            value: exif::Value::Short(vec![8, 8, 8]),
        };
        let map = normalize([&single, &many]);
        assert_eq!(map["Orientation"], 6);
        assert_eq!(map["BitsPerSample"], serde_json::json!([8, 8, 8]));
    }

    #[test]
    fn rationals_become_floats() {
        let exposure = Field {
            tag: Tag::ExposureTime,
            ifd_num: In::PRIMARY,
            value: exif::Value::Rational(vec![exif::Rational { num: 1, denom: 4 }]),
        };
        let broken = Field {
            tag: Tag::FNumber,
            ifd_num: In::PRIMARY,
            value: exif::Value::Rational(vec![exif::Rational { num: 1, denom: 0 }]),
        };
        let map = normalize([&exposure, &broken]);
        assert_eq!(map["ExposureTime"], 0.25);
        assert_eq!(map["FNumber"], Value::Null);
    }

    #[test]
    fn thumbnail_ifd_fields_skipped() {
        let thumb = Field {
            tag: Tag::Compression,
            ifd_num: In::THUMBNAIL,
            value: exif::Value::Short(vec![6]),
        };
        assert!(normalize([&thumb]).is_empty());
    }
}
