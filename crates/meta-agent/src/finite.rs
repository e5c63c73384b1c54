//! Non-finite float detection for serializable values.
//!
//! `serde_json` writes NaN and the infinities as `null`. Left alone, a record
//! holding `NaN` would fingerprint and archive exactly like one holding
//! `null`, so every value is walked once and rejected if any float in it is
//! not finite.

use std::fmt;

use serde::ser::{self, Serialize};

/// Why a value was rejected: a non-finite float, or a custom error raised
/// by the value's own `Serialize` impl.
#[derive(Debug)]
pub(crate) struct Rejected(String);

impl fmt::Display for Rejected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for Rejected {}

impl ser::Error for Rejected {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Self(msg.to_string())
    }
}

/// Walk `value` and fail on the first float that is NaN or infinite.
pub(crate) fn check<T: Serialize + ?Sized>(value: &T) -> Result<(), Rejected> {
    value.serialize(FiniteCheck)
}

#[derive(Clone, Copy)]
struct FiniteCheck;

fn finite(v: f64) -> Result<(), Rejected> {
    if v.is_finite() {
        Ok(())
    } else {
        Err(Rejected(format!(
            "float {} has no JSON representation",
            v
        )))
    }
}

impl ser::Serializer for FiniteCheck {
    type Ok = ();
    type Error = Rejected;
    type SerializeSeq = Self;
    type SerializeTuple = Self;
    type SerializeTupleStruct = Self;
    type SerializeTupleVariant = Self;
    type SerializeMap = Self;
    type SerializeStruct = Self;
    type SerializeStructVariant = Self;

    fn serialize_bool(self, _: bool) -> Result<(), Rejected> {
        Ok(())
    }

    fn serialize_i8(self, _: i8) -> Result<(), Rejected> {
        Ok(())
    }

    fn serialize_i16(self, _: i16) -> Result<(), Rejected> {
        Ok(())
    }

    fn serialize_i32(self, _: i32) -> Result<(), Rejected> {
        Ok(())
    }

    fn serialize_i64(self, _: i64) -> Result<(), Rejected> {
        Ok(())
    }

    fn serialize_i128(self, _: i128) -> Result<(), Rejected> {
        Ok(())
    }

    fn serialize_u8(self, _: u8) -> Result<(), Rejected> {
        Ok(())
    }

    fn serialize_u16(self, _: u16) -> Result<(), Rejected> {
        Ok(())
    }

    fn serialize_u32(self, _: u32) -> Result<(), Rejected> {
        Ok(())
    }

    fn serialize_u64(self, _: u64) -> Result<(), Rejected> {
        Ok(())
    }

    fn serialize_u128(self, _: u128) -> Result<(), Rejected> {
        Ok(())
    }

    fn serialize_f32(self, v: f32) -> Result<(), Rejected> {
        finite(f64::from(v))
    }

    fn serialize_f64(self, v: f64) -> Result<(), Rejected> {
        finite(v)
    }

    fn serialize_char(self, _: char) -> Result<(), Rejected> {
        Ok(())
    }

    fn serialize_str(self, _: &str) -> Result<(), Rejected> {
        Ok(())
    }

    fn serialize_bytes(self, _: &[u8]) -> Result<(), Rejected> {
        Ok(())
    }

    fn serialize_none(self) -> Result<(), Rejected> {
        Ok(())
    }

    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Result<(), Rejected> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<(), Rejected> {
        Ok(())
    }

    fn serialize_unit_struct(self, _: &'static str) -> Result<(), Rejected> {
        Ok(())
    }

    fn serialize_unit_variant(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
    ) -> Result<(), Rejected> {
        Ok(())
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        _: &'static str,
        value: &T,
    ) -> Result<(), Rejected> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        value: &T,
    ) -> Result<(), Rejected> {
        value.serialize(self)
    }

    fn serialize_seq(self, _: Option<usize>) -> Result<Self, Rejected> {
        Ok(self)
    }

    fn serialize_tuple(self, _: usize) -> Result<Self, Rejected> {
        Ok(self)
    }

    fn serialize_tuple_struct(self, _: &'static str, _: usize) -> Result<Self, Rejected> {
        Ok(self)
    }

    fn serialize_tuple_variant(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        _: usize,
    ) -> Result<Self, Rejected> {
        Ok(self)
    }

    fn serialize_map(self, _: Option<usize>) -> Result<Self, Rejected> {
        Ok(self)
    }

    fn serialize_struct(self, _: &'static str, _: usize) -> Result<Self, Rejected> {
        Ok(self)
    }

    fn serialize_struct_variant(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        _: usize,
    ) -> Result<Self, Rejected> {
        Ok(self)
    }
}

impl ser::SerializeSeq for FiniteCheck {
    type Ok = ();
    type Error = Rejected;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), Rejected> {
        value.serialize(FiniteCheck)
    }

    fn end(self) -> Result<(), Rejected> {
        Ok(())
    }
}

impl ser::SerializeTuple for FiniteCheck {
    type Ok = ();
    type Error = Rejected;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), Rejected> {
        value.serialize(FiniteCheck)
    }

    fn end(self) -> Result<(), Rejected> {
        Ok(())
    }
}

impl ser::SerializeTupleStruct for FiniteCheck {
    type Ok = ();
    type Error = Rejected;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), Rejected> {
        value.serialize(FiniteCheck)
    }

    fn end(self) -> Result<(), Rejected> {
        Ok(())
    }
}

impl ser::SerializeTupleVariant for FiniteCheck {
    type Ok = ();
    type Error = Rejected;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), Rejected> {
        value.serialize(FiniteCheck)
    }

    fn end(self) -> Result<(), Rejected> {
        Ok(())
    }
}

impl ser::SerializeMap for FiniteCheck {
    type Ok = ();
    type Error = Rejected;

    fn serialize_key<T: ?Sized + Serialize>(&mut self, key: &T) -> Result<(), Rejected> {
        key.serialize(FiniteCheck)
    }

    fn serialize_value<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), Rejected> {
        value.serialize(FiniteCheck)
    }

    fn end(self) -> Result<(), Rejected> {
        Ok(())
    }
}

impl ser::SerializeStruct for FiniteCheck {
    type Ok = ();
    type Error = Rejected;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        _: &'static str,
        value: &T,
    ) -> Result<(), Rejected> {
        value.serialize(FiniteCheck)
    }

    fn end(self) -> Result<(), Rejected> {
        Ok(())
    }
}

impl ser::SerializeStructVariant for FiniteCheck {
    type Ok = ();
    type Error = Rejected;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        _: &'static str,
        value: &T,
    ) -> Result<(), Rejected> {
        value.serialize(FiniteCheck)
    }

    fn end(self) -> Result<(), Rejected> {
        Ok(())
    }
}
