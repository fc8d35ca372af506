#![allow(dead_code)]

use crate::decoder::cursor::Cursor;
use crate::errors::DecodeError;

/// One constant pool tag, as laid out in spec. §4.1. Long/Double values
/// occupy two pool slots; the second slot is represented as `None` in the
/// enclosing `ConstantPool`, never as an entry of its own.
#[derive(Debug, Clone)]
pub(crate) enum ConstantPoolEntry {
    Utf8(String),
    Integer,
    Float,
    Long,
    Double,
    Class {
        name_index: u16,
    },
    String {
        string_index: u16,
    },
    FieldRef {
        class_index: u16,
        name_and_type_index: u16,
    },
    MethodRef {
        class_index: u16,
        name_and_type_index: u16,
    },
    InterfaceMethodRef {
        class_index: u16,
        name_and_type_index: u16,
    },
    NameAndType {
        name_index: u16,
        descriptor_index: u16,
    },
    MethodHandle {
        reference_kind: u8,
        reference_index: u16,
    },
    MethodType {
        descriptor_index: u16,
    },
    InvokeDynamic {
        bootstrap_method_attr_index: u16,
        name_and_type_index: u16,
    },
}

/// 1-indexed constant pool: index 0, and the second slot of every
/// Long/Double, are `None` sentinels that must never be dereferenced.
#[derive(Debug, Clone)]
pub(crate) struct ConstantPool {
    entries: Vec<Option<ConstantPoolEntry>>,
}

impl ConstantPool {
    pub(crate) fn parse(cursor: &mut Cursor) -> Result<ConstantPool, DecodeError> {
        let count = cursor.u16()?;
        let mut entries = Vec::with_capacity(count as usize);
        entries.push(None); // index 0 is reserved

        let mut index = 1u16;
        while index < count {
            let tag = cursor.u8()?;
            let entry = match tag {
                1 => {
                    let len = cursor.u16()?;
                    let bytes = cursor.take(len as usize)?;
                    ConstantPoolEntry::Utf8(simd_cesu8::mutf8::decode_lossy(bytes).into_owned())
                }
                3 => {
                    cursor.skip(4)?;
                    ConstantPoolEntry::Integer
                }
                4 => {
                    cursor.skip(4)?;
                    ConstantPoolEntry::Float
                }
                5 => {
                    cursor.skip(8)?;
                    ConstantPoolEntry::Long
                }
                6 => {
                    cursor.skip(8)?;
                    ConstantPoolEntry::Double
                }
                7 => ConstantPoolEntry::Class {
                    name_index: cursor.u16()?,
                },
                8 => ConstantPoolEntry::String {
                    string_index: cursor.u16()?,
                },
                9 => ConstantPoolEntry::FieldRef {
                    class_index: cursor.u16()?,
                    name_and_type_index: cursor.u16()?,
                },
                10 => ConstantPoolEntry::MethodRef {
                    class_index: cursor.u16()?,
                    name_and_type_index: cursor.u16()?,
                },
                11 => ConstantPoolEntry::InterfaceMethodRef {
                    class_index: cursor.u16()?,
                    name_and_type_index: cursor.u16()?,
                },
                12 => ConstantPoolEntry::NameAndType {
                    name_index: cursor.u16()?,
                    descriptor_index: cursor.u16()?,
                },
                15 => ConstantPoolEntry::MethodHandle {
                    reference_kind: cursor.u8()?,
                    reference_index: cursor.u16()?,
                },
                16 => ConstantPoolEntry::MethodType {
                    descriptor_index: cursor.u16()?,
                },
                18 => ConstantPoolEntry::InvokeDynamic {
                    bootstrap_method_attr_index: cursor.u16()?,
                    name_and_type_index: cursor.u16()?,
                },
                other => return Err(DecodeError::UnknownConstantTag(other)),
            };

            let occupies_two_slots =
                matches!(entry, ConstantPoolEntry::Long | ConstantPoolEntry::Double);

            entries.push(Some(entry));
            index += 1;

            if occupies_two_slots {
                entries.push(None);
                index += 1;
            }
        }

        Ok(ConstantPool { entries })
    }

    fn get(&self, index: u16) -> Result<&ConstantPoolEntry, DecodeError> {
        self.entries
            .get(index as usize)
            .and_then(|slot| slot.as_ref())
            .ok_or(DecodeError::IndexOutOfRange(index))
    }

    /// Resolve a UTF8 entry directly by index.
    pub(crate) fn utf8(&self, index: u16) -> Result<&str, DecodeError> {
        match self.get(index)? {
            ConstantPoolEntry::Utf8(s) => Ok(s.as_str()),
            _ => Err(DecodeError::IndexOutOfRange(index)),
        }
    }

    /// Resolve a Class entry to its internal (slash-separated) name.
    pub(crate) fn class_internal_name(&self, index: u16) -> Result<&str, DecodeError> {
        match self.get(index)? {
            ConstantPoolEntry::Class { name_index } => self.utf8(*name_index),
            _ => Err(DecodeError::IndexOutOfRange(index)),
        }
    }

    /// Resolve a Class entry to its dotted form (`java/lang/Object` -> `java.lang.Object`).
    pub(crate) fn class_dotted_name(&self, index: u16) -> Result<String, DecodeError> {
        Ok(self.class_internal_name(index)?.replace('/', "."))
    }

    /// Every Class entry's internal name, in pool order (spec §4.1
    /// "Referenced-class extraction" walks the pool for tag-7 entries).
    pub(crate) fn class_entry_names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().filter_map(|slot| match slot {
            Some(ConstantPoolEntry::Class { name_index }) => self.utf8(*name_index).ok(),
            _ => None,
        })
    }
}
