use std::fmt;
use num_enum::TryFromPrimitive;

/// Render a raw tag as its variant name, or as hex when it has none.
pub fn enum_name_or_hex<T>(raw: T::Primitive) -> String
where
    T: TryFromPrimitive + fmt::Debug,
    T::Primitive: fmt::LowerHex,
{
    match T::try_from_primitive(raw) {
        Ok(variant) => format!("{:?}", variant),
        Err(_) => format!("0x{:x}", raw),
    }
}

/// Native entry points in this crate take `int` lengths.
pub(crate) fn native_len(len: usize) -> Option<i32> {
    i32::try_from(len).ok()
}
