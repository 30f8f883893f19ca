//! Rejection of floats that JSON cannot represent.
//!
//! `serde_json` turns NaN and the infinities into `null` without complaint. Walking a value
//! with [`FiniteCheck`] before it is converted catches them while the original number is
//! still visible.

use serde::ser::{self, Error as _, Serialize};

type Result = std::result::Result<(), serde_json::Error>;

/// Fails if `value` contains a NaN or infinite float anywhere inside it.
pub(crate) fn check_finite<T: Serialize + ?Sized>(value: &T) -> Result {
    value.serialize(FiniteCheck)
}

fn finite(v: f64) -> Result {
    if v.is_finite() {
        Ok(())
    } else {
        Err(serde_json::Error::custom(format!(
            "non-finite number {v} has no JSON representation"
        )))
    }
}

/// A serializer that produces nothing and only inspects floats.
#[derive(Clone, Copy)]
struct FiniteCheck;

impl ser::Serializer for FiniteCheck {
    type Ok = ();
    type Error = serde_json::Error;
    type SerializeSeq = Self;
    type SerializeTuple = Self;
    type SerializeTupleStruct = Self;
    type SerializeTupleVariant = Self;
    type SerializeMap = Self;
    type SerializeStruct = Self;
    type SerializeStructVariant = Self;

    fn serialize_f32(self, v: f32) -> Result {
        finite(f64::from(v))
    }

    fn serialize_f64(self, v: f64) -> Result {
        finite(v)
    }

    fn serialize_bool(self, _v: bool) -> Result {
        Ok(())
    }

    fn serialize_i8(self, _v: i8) -> Result {
        Ok(())
    }

    fn serialize_i16(self, _v: i16) -> Result {
        Ok(())
    }

    fn serialize_i32(self, _v: i32) -> Result {
        Ok(())
    }

    fn serialize_i64(self, _v: i64) -> Result {
        Ok(())
    }

    fn serialize_i128(self, _v: i128) -> Result {
        Ok(())
    }

    fn serialize_u8(self, _v: u8) -> Result {
        Ok(())
    }

    fn serialize_u16(self, _v: u16) -> Result {
        Ok(())
    }

    fn serialize_u32(self, _v: u32) -> Result {
        Ok(())
    }

    fn serialize_u64(self, _v: u64) -> Result {
        Ok(())
    }

    fn serialize_u128(self, _v: u128) -> Result {
        Ok(())
    }

    fn serialize_char(self, _v: char) -> Result {
        Ok(())
    }

    fn serialize_str(self, _v: &str) -> Result {
        Ok(())
    }

    fn serialize_bytes(self, _v: &[u8]) -> Result {
        Ok(())
    }

    fn serialize_none(self) -> Result {
        Ok(())
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Result {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result {
        Ok(())
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result {
        Ok(())
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
    ) -> Result {
        Ok(())
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        value: &T,
    ) -> Result {
        value.serialize(self)
    }

    fn serialize_seq(self, _len: Option<usize>) -> std::result::Result<Self, Self::Error> {
        Ok(self)
    }

    fn serialize_tuple(self, _len: usize) -> std::result::Result<Self, Self::Error> {
        Ok(self)
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> std::result::Result<Self, Self::Error> {
        Ok(self)
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> std::result::Result<Self, Self::Error> {
        Ok(self)
    }

    fn serialize_map(self, _len: Option<usize>) -> std::result::Result<Self, Self::Error> {
        Ok(self)
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> std::result::Result<Self, Self::Error> {
        Ok(self)
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> std::result::Result<Self, Self::Error> {
        Ok(self)
    }
}

impl ser::SerializeSeq for FiniteCheck {
    type Ok = ();
    type Error = serde_json::Error;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result {
        value.serialize(FiniteCheck)
    }

    fn end(self) -> Result {
        Ok(())
    }
}

impl ser::SerializeTuple for FiniteCheck {
    type Ok = ();
    type Error = serde_json::Error;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result {
        value.serialize(FiniteCheck)
    }

    fn end(self) -> Result {
        Ok(())
    }
}

impl ser::SerializeTupleStruct for FiniteCheck {
    type Ok = ();
    type Error = serde_json::Error;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result {
        value.serialize(FiniteCheck)
    }

    fn end(self) -> Result {
        Ok(())
    }
}

impl ser::SerializeTupleVariant for FiniteCheck {
    type Ok = ();
    type Error = serde_json::Error;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result {
        value.serialize(FiniteCheck)
    }

    fn end(self) -> Result {
        Ok(())
    }
}

impl ser::SerializeMap for FiniteCheck {
    type Ok = ();
    type Error = serde_json::Error;

    // Keys are validated by serde_json itself when the value is converted.
    fn serialize_key<T: Serialize + ?Sized>(&mut self, _key: &T) -> Result {
        Ok(())
    }

    fn serialize_value<T: Serialize + ?Sized>(&mut self, value: &T) -> Result {
        value.serialize(FiniteCheck)
    }

    fn end(self) -> Result {
        Ok(())
    }
}

impl ser::SerializeStruct for FiniteCheck {
    type Ok = ();
    type Error = serde_json::Error;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, _key: &'static str, value: &T) -> Result {
        value.serialize(FiniteCheck)
    }

    fn end(self) -> Result {
        Ok(())
    }
}

impl ser::SerializeStructVariant for FiniteCheck {
    type Ok = ();
    type Error = serde_json::Error;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, _key: &'static str, value: &T) -> Result {
        value.serialize(FiniteCheck)
    }

    fn end(self) -> Result {
        Ok(())
    }
}
