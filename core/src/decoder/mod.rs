//! Binary decoder for `.class` files (spec. §4.1).

mod class;
mod constant_pool;
mod cursor;

pub use class::{Attribute, AttributeValue, DecodedClass, Member};

use cursor::Cursor;

use crate::errors::DecodeError;

/// Decodes a `.class` file's bytes into a [`DecodedClass`].
pub fn decode(bytes: &[u8]) -> Result<DecodedClass, DecodeError> {
    let mut cursor = Cursor::new(bytes);
    DecodedClass::parse(&mut cursor, bytes.len() as u64)
}

/// Minimal class-file fixtures shared by other modules' tests (e.g.
/// `node.rs`'s factory tests), so they don't need to know the class-file
/// binary layout to get a real `DecodedClass` to work with.
#[cfg(test)]
pub(crate) mod test_support {
    use super::decode;
    use crate::decoder::DecodedClass;

    /// A class `this_name` (dotted or internal form accepted; converted to
    /// internal form here) extending `java.lang.Object`, with no
    /// interfaces, referencing one extra class (`extra_ref`, internal
    /// form) purely as a constant-pool Class entry.
    pub(crate) fn minimal_class(this_name: &str, extra_ref: &str) -> DecodedClass {
        decode(&minimal_class_bytes(this_name, extra_ref)).expect("minimal fixture class should decode")
    }

    /// Same class-file fixture as [`minimal_class`], but as raw bytes —
    /// for tests that need an on-disk `.class` file rather than an
    /// already-decoded summary.
    pub(crate) fn minimal_class_bytes(this_name: &str, extra_ref: &str) -> Vec<u8> {
        struct Pool {
            bytes: Vec<u8>,
            next_index: u16,
        }

        impl Pool {
            fn utf8(&mut self, s: &str) -> u16 {
                let idx = self.next_index;
                self.bytes.push(1);
                self.bytes.extend_from_slice(&(s.len() as u16).to_be_bytes());
                self.bytes.extend_from_slice(s.as_bytes());
                self.next_index += 1;
                idx
            }

            fn class(&mut self, name_index: u16) -> u16 {
                let idx = self.next_index;
                self.bytes.push(7);
                self.bytes.extend_from_slice(&name_index.to_be_bytes());
                self.next_index += 1;
                idx
            }
        }

        let this_internal = this_name.replace('.', "/");
        let mut pool = Pool {
            bytes: Vec::new(),
            next_index: 1,
        };

        let this_utf8 = pool.utf8(&this_internal);
        let this_class = pool.class(this_utf8);

        let super_utf8 = pool.utf8("java/lang/Object");
        let super_class = pool.class(super_utf8);

        let extra_utf8 = pool.utf8(extra_ref);
        let _extra_class = pool.class(extra_utf8);

        let mut out = Vec::new();
        out.extend_from_slice(&0xCAFE_BABEu32.to_be_bytes());
        out.extend_from_slice(&0u16.to_be_bytes());
        out.extend_from_slice(&52u16.to_be_bytes());
        out.extend_from_slice(&pool.next_index.to_be_bytes()); // constant_pool_count
        out.extend_from_slice(&pool.bytes);

        out.extend_from_slice(&0u16.to_be_bytes()); // access_flags
        out.extend_from_slice(&this_class.to_be_bytes());
        out.extend_from_slice(&super_class.to_be_bytes());
        out.extend_from_slice(&0u16.to_be_bytes()); // interface_count
        out.extend_from_slice(&0u16.to_be_bytes()); // fields_count
        out.extend_from_slice(&0u16.to_be_bytes()); // methods_count
        out.extend_from_slice(&0u16.to_be_bytes()); // attributes_count

        out
    }
}
