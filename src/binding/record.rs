//! Explicit field-binding descriptors.
//!
//! A record type declares, once, an ordered list of fields. Each field pairs a
//! [`BindingPath`] with a translator that turns raw cell text into the field's
//! value. The scanners only ever see records through the object-safe
//! [`RecordHandle`] trait, so one scan can fill several record types at once.
use crate::binding::path::BindingPath;
use anyhow::anyhow;
use anyhow::Context;
use anyhow::Result;
use chrono::Duration;
use chrono::NaiveDate;
use chrono::NaiveDateTime;
use chrono::NaiveTime;
use iso8601_duration::Duration as IsoDuration;
use std::any::Any;

/// Converts the text of one cell into a typed value.
///
/// `column` is the 1-based column the cell was read from.
pub trait Translate: Sized {
    fn translate(cell: &str, column: usize) -> Result<Self>;
}

type Assign<R> = Box<dyn Fn(&mut R, &str, usize) -> Result<()> + Send + Sync>;

/// One bound field of record type `R`.
pub struct Field<R> {
    pub name: &'static str,
    pub path: BindingPath,
    assign: Assign<R>,
}

/// Ordered field descriptors of a record type.
pub struct Schema<R> {
    fields: Vec<Field<R>>,
}

pub struct SchemaBuilder<R> {
    fields: Vec<Field<R>>,
}

impl<R> Schema<R> {
    pub fn builder() -> SchemaBuilder<R> {
        SchemaBuilder { fields: Vec::new() }
    }

    pub fn fields(&self) -> &[Field<R>] {
        &self.fields
    }
}

impl<R> SchemaBuilder<R> {
    /// Binds a field whose type knows how to translate itself.
    pub fn field<T, S>(self, name: &'static str, path: impl Into<BindingPath>, set: S) -> Self
    where
        T: Translate + 'static,
        S: Fn(&mut R, T) + Send + Sync + 'static,
    {
        self.field_with(name, path, T::translate, set)
    }

    /// Binds a field with a custom translator.
    pub fn field_with<T, F, S>(
        mut self,
        name: &'static str,
        path: impl Into<BindingPath>,
        translate: F,
        set: S,
    ) -> Self
    where
        T: 'static,
        F: Fn(&str, usize) -> Result<T> + Send + Sync + 'static,
        S: Fn(&mut R, T) + Send + Sync + 'static,
    {
        self.fields.push(Field {
            name,
            path: path.into(),
            assign: Box::new(move |record, cell, column| {
                let value = translate(cell, column)?;
                set(record, value);
                Ok(())
            }),
        });
        self
    }

    pub fn build(self) -> Schema<R> {
        Schema {
            fields: self.fields,
        }
    }
}

/// A record type that can be filled from a sheet row.
///
/// ```ignore
/// impl Record for Sale {
///     fn schema() -> &'static Schema<Self> {
///         static SCHEMA: OnceLock<Schema<Sale>> = OnceLock::new();
///         SCHEMA.get_or_init(|| {
///             Schema::<Sale>::builder()
///                 .field("total", "Sales|Total", |sale, total: f64| sale.total = total)
///                 .build()
///         })
///     }
/// }
/// ```
pub trait Record: Default + Send + 'static {
    fn schema() -> &'static Schema<Self>;
}

/// Type-erased, mutable view of a record instance.
pub trait RecordHandle: Any + Send {
    fn field_count(&self) -> usize;

    fn field_name(&self, index: usize) -> &'static str;

    fn field_path(&self, index: usize) -> &BindingPath;

    /// Translates `cell` and stores it into field `index`. The field is left
    /// untouched when translation fails.
    fn assign(&mut self, index: usize, cell: &str, column: usize) -> Result<()>;

    /// A zero-valued instance of the same record type.
    fn fresh(&self) -> Box<dyn RecordHandle>;

    fn as_any(&self) -> &dyn Any;

    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl<R: Record> RecordHandle for R {
    fn field_count(&self) -> usize {
        R::schema().fields.len()
    }

    fn field_name(&self, index: usize) -> &'static str {
        R::schema().fields[index].name
    }

    fn field_path(&self, index: usize) -> &BindingPath {
        &R::schema().fields[index].path
    }

    fn assign(&mut self, index: usize, cell: &str, column: usize) -> Result<()> {
        (R::schema().fields[index].assign)(self, cell, column)
    }

    fn fresh(&self) -> Box<dyn RecordHandle> {
        Box::new(R::default())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

impl dyn RecordHandle {
    pub fn downcast_ref<R: Record>(&self) -> Option<&R> {
        self.as_any().downcast_ref::<R>()
    }

    pub fn downcast<R: Record>(self: Box<Self>) -> Option<R> {
        self.into_any().downcast::<R>().ok().map(|record| *record)
    }

    /// Binding paths of every field, in declaration order.
    pub fn field_paths(&self) -> Vec<&BindingPath> {
        (0..self.field_count()).map(|index| self.field_path(index)).collect()
    }
}

// Built-in translators

impl Translate for String {
    fn translate(cell: &str, _column: usize) -> Result<Self> {
        Ok(cell.to_owned())
    }
}

impl<T: Translate> Translate for Option<T> {
    fn translate(cell: &str, column: usize) -> Result<Self> {
        if cell.trim().is_empty() {
            Ok(None)
        } else {
            T::translate(cell, column).map(Some)
        }
    }
}

impl Translate for bool {
    fn translate(cell: &str, _column: usize) -> Result<Self> {
        match cell.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "y" => Ok(true),
            "0" | "false" | "no" | "n" => Ok(false),
            _ => Err(anyhow!("parse '{cell}' to bool failed")),
        }
    }
}

macro_rules! translate_parsed {
    ($($kind:ty),*) => {
        $(
            impl Translate for $kind {
                fn translate(cell: &str, _column: usize) -> Result<Self> {
                    cell.trim()
                        .parse::<$kind>()
                        .with_context(|| format!("parse '{}' to {} failed", cell, stringify!($kind)))
                }
            }
        )*
    };
}

translate_parsed!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

/// Serial number of 9999-12-31, the last day a worksheet can hold.
const MAX_SERIAL: f64 = 2_958_465.0;

/// Days between 1899-12-30 and the serial number, with the Lotus 1-2-3 leap year bug.
/// Serials outside `0..=MAX_SERIAL` (NaN and infinities included) yield `None`.
fn serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !(0.0..MAX_SERIAL + 1.0).contains(&serial) {
        return None;
    }
    let days = serial.trunc() as i64;
    let offset = if days < 60 { 1 } else { 0 };
    let micros = (serial.fract() * 86_400_000_000f64).round() as i64;
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let delta = Duration::try_days(days + offset)?.checked_add(&Duration::microseconds(micros))?;
    epoch.checked_add_signed(delta)
}

impl Translate for NaiveDate {
    fn translate(cell: &str, _column: usize) -> Result<Self> {
        let text = cell.trim();
        NaiveDate::parse_from_str(text, "%Y-%m-%d")
            .ok()
            .or_else(|| NaiveDate::parse_from_str(text, "%Y/%m/%d").ok())
            .or_else(|| text.parse::<f64>().ok().and_then(serial_to_datetime).map(|it| it.date()))
            .ok_or_else(|| anyhow!("parse '{cell}' to date failed"))
    }
}

impl Translate for NaiveDateTime {
    fn translate(cell: &str, _column: usize) -> Result<Self> {
        let text = cell.trim();
        ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f", "%Y/%m/%d %H:%M:%S%.f"]
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
            .or_else(|| text.parse::<f64>().ok().and_then(serial_to_datetime))
            .ok_or_else(|| anyhow!("parse '{cell}' to datetime failed"))
    }
}

impl Translate for NaiveTime {
    fn translate(cell: &str, _column: usize) -> Result<Self> {
        let text = cell.trim();
        NaiveTime::parse_from_str(text, "%H:%M:%S%.f")
            .ok()
            .or_else(|| NaiveTime::parse_from_str(text, "%H:%M").ok())
            .or_else(|| {
                text.parse::<f64>()
                    .ok()
                    .filter(|fraction| (0.0..1.0).contains(fraction))
                    .and_then(serial_to_datetime)
                    .map(|it| it.time())
            })
            .ok_or_else(|| anyhow!("parse '{cell}' to time failed"))
    }
}

impl Translate for Duration {
    fn translate(cell: &str, _column: usize) -> Result<Self> {
        let duration = cell
            .trim()
            .parse::<IsoDuration>()
            .map_err(|_| anyhow!("parse '{cell}' to iso8601 duration failed"))?;
        if duration.year != 0.0 || duration.month != 0.0 {
            return Err(anyhow!("duration '{cell}' has no fixed length"));
        }
        let seconds = duration.day as f64 * 86_400.0
            + duration.hour as f64 * 3_600.0
            + duration.minute as f64 * 60.0
            + duration.second as f64;
        Ok(Duration::milliseconds((seconds * 1_000.0).round() as i64))
    }
}
