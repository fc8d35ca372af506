use std::fmt;

use crate::decoder::constant_pool::ConstantPool;
use crate::decoder::cursor::Cursor;
use crate::errors::DecodeError;

const ACC_PUBLIC: u16 = 0x0001;
const ACC_FINAL: u16 = 0x0010;
const ACC_SUPER: u16 = 0x0020;
const ACC_INTERFACE: u16 = 0x0200;
const ACC_ABSTRACT: u16 = 0x0400;
const ACC_SYNTHETIC: u16 = 0x1000;
const ACC_ANNOTATION: u16 = 0x2000;
const ACC_ENUM: u16 = 0x4000;

const PRIMITIVE_DESCRIPTORS: &[char] = &['I', 'J', 'Z', 'B', 'C', 'S', 'F', 'D', 'V'];

#[derive(Debug, Clone)]
pub enum AttributeValue {
    SourceFile(String),
    Deprecated,
    Code { length: u32 },
    Signature(String),
    Exceptions(Vec<String>),
    Unknown,
}

#[derive(Debug, Clone)]
pub struct Attribute {
    pub name: String,
    pub value: AttributeValue,
}

#[derive(Debug, Clone)]
pub struct Member {
    pub name: String,
    pub descriptor: String,
    pub attributes: Vec<Attribute>,
}

/// A fully decoded `.class` file: its declaration, members, and the
/// dependency views derived from its constant pool.
#[derive(Debug, Clone)]
pub struct DecodedClass {
    pub minor_version: u16,
    pub major_version: u16,

    pub name: String,
    pub package: String,
    pub super_name: String,
    pub interfaces: Vec<String>,

    pub public: bool,
    pub final_: bool,
    pub super_flag: bool,
    pub interface: bool,
    pub abstract_: bool,
    pub synthetic: bool,
    pub annotation: bool,
    pub enum_: bool,

    pub fields: Vec<Member>,
    pub methods: Vec<Member>,
    pub attributes: Vec<Attribute>,

    pub total_size: u64,
    pub code_size: u64,

    constant_pool: ConstantPool,
}

impl DecodedClass {
    pub(crate) fn parse(cursor: &mut Cursor, total_size: u64) -> Result<DecodedClass, DecodeError> {
        let magic = cursor.u32()?;
        if magic != 0xCAFE_BABE {
            return Err(DecodeError::InvalidMagic);
        }

        let minor_version = cursor.u16()?;
        let major_version = cursor.u16()?;

        let constant_pool = ConstantPool::parse(cursor)?;

        let access_flags = cursor.u16()?;
        let this_class = cursor.u16()?;
        let super_class = cursor.u16()?;

        let name = constant_pool.class_dotted_name(this_class)?;
        let super_name = if super_class == 0 {
            String::new()
        } else {
            constant_pool.class_dotted_name(super_class)?
        };

        let interface_count = cursor.u16()?;
        let mut interfaces = Vec::with_capacity(interface_count as usize);
        for _ in 0..interface_count {
            let interface_index = cursor.u16()?;
            interfaces.push(constant_pool.class_dotted_name(interface_index)?);
        }

        let package = match name.rfind('.') {
            Some(pos) => name[..pos].to_string(),
            None => String::new(),
        };

        let fields = Self::parse_members(cursor, &constant_pool)?;
        let methods = Self::parse_members(cursor, &constant_pool)?;
        let attributes = Self::parse_attributes(cursor, &constant_pool)?;

        let mut code_size = 0u64;
        for member in fields.iter().chain(methods.iter()) {
            code_size += Self::code_length_of(&member.attributes);
        }
        code_size += Self::code_length_of(&attributes);

        Ok(DecodedClass {
            minor_version,
            major_version,
            name,
            package,
            super_name,
            interfaces,
            public: access_flags & ACC_PUBLIC != 0,
            final_: access_flags & ACC_FINAL != 0,
            super_flag: access_flags & ACC_SUPER != 0,
            interface: access_flags & ACC_INTERFACE != 0,
            abstract_: access_flags & ACC_ABSTRACT != 0,
            synthetic: access_flags & ACC_SYNTHETIC != 0,
            annotation: access_flags & ACC_ANNOTATION != 0,
            enum_: access_flags & ACC_ENUM != 0,
            fields,
            methods,
            attributes,
            total_size,
            code_size,
            constant_pool,
        })
    }

    fn code_length_of(attributes: &[Attribute]) -> u64 {
        attributes
            .iter()
            .map(|attr| match attr.value {
                AttributeValue::Code { length } => length as u64,
                _ => 0,
            })
            .sum()
    }

    fn parse_members(
        cursor: &mut Cursor,
        pool: &ConstantPool,
    ) -> Result<Vec<Member>, DecodeError> {
        let count = cursor.u16()?;
        let mut members = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let _access_flags = cursor.u16()?;
            let name_index = cursor.u16()?;
            let descriptor_index = cursor.u16()?;

            let name = pool.utf8(name_index)?.to_string();
            let descriptor = pool.utf8(descriptor_index)?.to_string();
            let attributes = Self::parse_attributes(cursor, pool)?;

            members.push(Member {
                name,
                descriptor,
                attributes,
            });
        }
        Ok(members)
    }

    fn parse_attributes(
        cursor: &mut Cursor,
        pool: &ConstantPool,
    ) -> Result<Vec<Attribute>, DecodeError> {
        let count = cursor.u16()?;
        let mut attributes = Vec::with_capacity(count as usize);
        for _ in 0..count {
            attributes.push(Self::parse_attribute_info(cursor, pool)?);
        }
        Ok(attributes)
    }

    fn parse_attribute_info(
        cursor: &mut Cursor,
        pool: &ConstantPool,
    ) -> Result<Attribute, DecodeError> {
        let name_index = cursor.u16()?;
        let length = cursor.u32()?;
        let name = pool.utf8(name_index)?.to_string();

        let remaining_before = cursor.remaining();
        let value = match name.as_str() {
            "SourceFile" => {
                let index = cursor.u16()?;
                AttributeValue::SourceFile(pool.utf8(index)?.to_string())
            }
            "Deprecated" => AttributeValue::Deprecated,
            "Code" => {
                cursor.skip(length as usize)?;
                AttributeValue::Code { length }
            }
            "Signature" => {
                let index = cursor.u16()?;
                AttributeValue::Signature(pool.utf8(index)?.to_string())
            }
            "Exceptions" => {
                let exception_count = cursor.u16()?;
                let mut exceptions = Vec::with_capacity(exception_count as usize);
                for _ in 0..exception_count {
                    let class_index = cursor.u16()?;
                    exceptions.push(pool.class_dotted_name(class_index)?);
                }
                AttributeValue::Exceptions(exceptions)
            }
            _ => {
                cursor.skip(length as usize)?;
                AttributeValue::Unknown
            }
        };

        let consumed = remaining_before - cursor.remaining();
        if consumed != length as usize {
            return Err(DecodeError::CorruptAttribute);
        }

        Ok(Attribute { name, value })
    }

    /// Fully qualified class names this class's constant pool references,
    /// deduplicated in first-occurrence order.
    pub fn class_dependencies(&self) -> Vec<String> {
        let mut seen = Vec::new();
        for raw in self.constant_pool.class_entry_names() {
            if let Some(normalized) = normalize_class_descriptor(raw) {
                if !seen.contains(&normalized) {
                    seen.push(normalized);
                }
            }
        }
        seen
    }

    /// `class_dependencies`, sorted lexicographically.
    pub fn class_dependencies_sorted(&self) -> Vec<String> {
        let mut deps = self.class_dependencies();
        deps.sort();
        deps
    }

    /// Package prefixes of `class_dependencies`, deduplicated.
    pub fn package_dependencies(&self) -> Vec<String> {
        let mut seen = Vec::new();
        for class_name in self.class_dependencies() {
            let package = match class_name.rfind('.') {
                Some(pos) => class_name[..pos].to_string(),
                None => String::new(),
            };
            if !seen.contains(&package) {
                seen.push(package);
            }
        }
        seen
    }

    /// `package_dependencies`, sorted lexicographically.
    pub fn package_dependencies_sorted(&self) -> Vec<String> {
        let mut deps = self.package_dependencies();
        deps.sort();
        deps
    }
}

/// Applies the array/primitive/slash-to-dot normalization to one raw Class
/// entry name. Returns `None` when the descriptor names a primitive type,
/// which is not a class reference.
fn normalize_class_descriptor(raw: &str) -> Option<String> {
    let without_array = raw.trim_start_matches('[');

    let unwrapped = if let Some(inner) = without_array
        .strip_prefix('L')
        .and_then(|s| s.strip_suffix(';'))
    {
        inner
    } else {
        without_array
    };

    if unwrapped.len() == 1 && PRIMITIVE_DESCRIPTORS.contains(&unwrapped.chars().next().unwrap())
    {
        return None;
    }

    if unwrapped.is_empty() {
        return None;
    }

    Some(unwrapped.replace('/', "."))
}


impl fmt::Display for DecodedClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.public {
            write!(f, "public ")?;
        }
        if self.final_ {
            write!(f, "final ")?;
        } else if self.abstract_ {
            write!(f, "abstract ")?;
        }

        if self.interface {
            write!(f, "interface ")?;
        } else if self.annotation {
            write!(f, "annotation ")?;
        } else if self.enum_ {
            write!(f, "enum ")?;
        } else {
            write!(f, "class ")?;
        }

        write!(f, "{}", self.name)?;

        if !self.super_name.is_empty() {
            write!(f, " extends {}", self.super_name)?;
        }

        if !self.interfaces.is_empty() {
            write!(f, " implements {}", self.interfaces.join(","))?;
        }

        Ok(())
    }
}
