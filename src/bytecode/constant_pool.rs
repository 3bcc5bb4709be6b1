use super::reader::ByteReader;
use super::ClassFileError;

/// A single constant pool entry, keeping only the fields reference
/// extraction needs
#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    Utf8(String),
    Integer,
    Float,
    Long,
    Double,
    Class { name_index: u16 },
    String { string_index: u16 },
    FieldRef { class_index: u16, name_and_type_index: u16 },
    MethodRef { class_index: u16, name_and_type_index: u16 },
    InterfaceMethodRef { class_index: u16, name_and_type_index: u16 },
    NameAndType { name_index: u16, descriptor_index: u16 },
    MethodHandle,
    MethodType { descriptor_index: u16 },
    Dynamic,
    InvokeDynamic,
    Module { name_index: u16 },
    Package { name_index: u16 },
    /// Second slot of a `Long` or `Double`
    Unusable,
}

/// Member reference resolved through the pool: owner class and descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberRef<'a> {
    pub owner: &'a str,
    pub name: &'a str,
    pub descriptor: &'a str,
}

#[derive(Debug, Clone, Default)]
pub struct ConstantPool {
    /// Index 0 is unused, matching the 1-based indices in the class file
    entries: Vec<Constant>,
}

impl ConstantPool {
    pub fn parse(reader: &mut ByteReader<'_>) -> Result<Self, ClassFileError> {
        let count = reader.u2()? as usize;
        let mut entries = Vec::with_capacity(count.max(1));
        entries.push(Constant::Unusable);

        let mut index = 1;
        while index < count {
            let tag = reader.u1()?;
            let constant = match tag {
                1 => {
                    let len = reader.u2()? as usize;
                    let bytes = reader.take(len)?;
                    // Modified UTF-8 only differs for NUL and supplementary
                    // characters, neither of which appear in class names
                    Constant::Utf8(String::from_utf8_lossy(bytes).into_owned())
                }
                3 => {
                    reader.skip(4)?;
                    Constant::Integer
                }
                4 => {
                    reader.skip(4)?;
                    Constant::Float
                }
                5 => {
                    reader.skip(8)?;
                    Constant::Long
                }
                6 => {
                    reader.skip(8)?;
                    Constant::Double
                }
                7 => Constant::Class {
                    name_index: reader.u2()?,
                },
                8 => Constant::String {
                    string_index: reader.u2()?,
                },
                9 => Constant::FieldRef {
                    class_index: reader.u2()?,
                    name_and_type_index: reader.u2()?,
                },
                10 => Constant::MethodRef {
                    class_index: reader.u2()?,
                    name_and_type_index: reader.u2()?,
                },
                11 => Constant::InterfaceMethodRef {
                    class_index: reader.u2()?,
                    name_and_type_index: reader.u2()?,
                },
                12 => Constant::NameAndType {
                    name_index: reader.u2()?,
                    descriptor_index: reader.u2()?,
                },
                15 => {
                    reader.skip(3)?;
                    Constant::MethodHandle
                }
                16 => Constant::MethodType {
                    descriptor_index: reader.u2()?,
                },
                17 => {
                    reader.skip(4)?;
                    Constant::Dynamic
                }
                18 => {
                    reader.skip(4)?;
                    Constant::InvokeDynamic
                }
                19 => Constant::Module {
                    name_index: reader.u2()?,
                },
                20 => Constant::Package {
                    name_index: reader.u2()?,
                },
                _ => return Err(ClassFileError::UnknownConstantTag { tag, index }),
            };

            let wide = matches!(constant, Constant::Long | Constant::Double);
            entries.push(constant);
            index += 1;

            // Long and Double take two slots
            if wide {
                entries.push(Constant::Unusable);
                index += 1;
            }
        }

        Ok(Self { entries })
    }

    pub fn get(&self, index: u16) -> Result<&Constant, ClassFileError> {
        match self.entries.get(index as usize) {
            Some(Constant::Unusable) | None => Err(ClassFileError::BadConstantIndex(index)),
            Some(constant) => Ok(constant),
        }
    }

    pub fn utf8(&self, index: u16) -> Result<&str, ClassFileError> {
        match self.get(index)? {
            Constant::Utf8(value) => Ok(value),
            _ => Err(ClassFileError::UnexpectedConstant {
                index,
                expected: "Utf8",
            }),
        }
    }

    /// Internal (slash-separated) name of a `Class` constant
    pub fn class_name(&self, index: u16) -> Result<&str, ClassFileError> {
        match self.get(index)? {
            Constant::Class { name_index } => self.utf8(*name_index),
            _ => Err(ClassFileError::UnexpectedConstant {
                index,
                expected: "Class",
            }),
        }
    }

    /// Resolve a field, method or interface-method reference
    pub fn member_ref(&self, index: u16) -> Result<MemberRef<'_>, ClassFileError> {
        let (class_index, name_and_type_index) = match self.get(index)? {
            Constant::FieldRef {
                class_index,
                name_and_type_index,
            }
            | Constant::MethodRef {
                class_index,
                name_and_type_index,
            }
            | Constant::InterfaceMethodRef {
                class_index,
                name_and_type_index,
            } => (*class_index, *name_and_type_index),
            _ => {
                return Err(ClassFileError::UnexpectedConstant {
                    index,
                    expected: "member reference",
                })
            }
        };

        let (name_index, descriptor_index) = match self.get(name_and_type_index)? {
            Constant::NameAndType {
                name_index,
                descriptor_index,
            } => (*name_index, *descriptor_index),
            _ => {
                return Err(ClassFileError::UnexpectedConstant {
                    index: name_and_type_index,
                    expected: "NameAndType",
                })
            }
        };

        Ok(MemberRef {
            owner: self.class_name(class_index)?,
            name: self.utf8(name_index)?,
            descriptor: self.utf8(descriptor_index)?,
        })
    }
}
