use super::constant_pool::ConstantPool;
use super::descriptor::{object_types, signature_types, to_binary_name};
use super::instructions::{class_operands, Operand};
use super::reader::ByteReader;
use super::ClassFileError;
use std::collections::HashSet;

const MAGIC: u32 = 0xCAFE_BABE;

pub const ACC_PUBLIC: u16 = 0x0001;
pub const ACC_PRIVATE: u16 = 0x0002;

/// A field or method with the attributes reference extraction cares about
#[derive(Debug, Clone, Default)]
pub struct Member {
    pub access_flags: u16,
    pub name: String,
    pub descriptor: String,
    /// Generic `Signature` attribute, methods only
    pub signature: Option<String>,
    /// Classes listed in the `Exceptions` attribute, internal form
    pub exceptions: Vec<String>,
    /// Class-bearing instruction operands from the `Code` attribute
    pub operands: Vec<Operand>,
}

/// The parts of a class file needed for dependency analysis
#[derive(Debug, Clone)]
pub struct ClassFile {
    pub access_flags: u16,
    /// Internal (slash-separated) name of this class
    pub this_class: String,
    pub super_class: Option<String>,
    pub interfaces: Vec<String>,
    pub fields: Vec<Member>,
    pub methods: Vec<Member>,
    constant_pool: ConstantPool,
}

impl ClassFile {
    /// Parse the full structure, including method bodies
    pub fn parse(bytes: &[u8]) -> Result<Self, ClassFileError> {
        Self::parse_with(bytes, true)
    }

    /// Parse only the header (access flags, names and supertypes)
    pub fn parse_header(bytes: &[u8]) -> Result<Self, ClassFileError> {
        Self::parse_with(bytes, false)
    }

    fn parse_with(bytes: &[u8], with_members: bool) -> Result<Self, ClassFileError> {
        let mut reader = ByteReader::new(bytes);

        let magic = reader.u4()?;
        if magic != MAGIC {
            return Err(ClassFileError::BadMagic(magic));
        }
        let _minor = reader.u2()?;
        let _major = reader.u2()?;

        let constant_pool = ConstantPool::parse(&mut reader)?;

        let access_flags = reader.u2()?;
        let this_class = constant_pool.class_name(reader.u2()?)?.to_string();
        let super_index = reader.u2()?;
        // java.lang.Object (and module-info) have no superclass
        let super_class = if super_index == 0 {
            None
        } else {
            Some(constant_pool.class_name(super_index)?.to_string())
        };

        let interface_count = reader.u2()?;
        let mut interfaces = Vec::with_capacity(interface_count as usize);
        for _ in 0..interface_count {
            interfaces.push(constant_pool.class_name(reader.u2()?)?.to_string());
        }

        let mut class = Self {
            access_flags,
            this_class,
            super_class,
            interfaces,
            fields: Vec::new(),
            methods: Vec::new(),
            constant_pool,
        };

        if with_members {
            class.fields = class.parse_members(&mut reader, false)?;
            class.methods = class.parse_members(&mut reader, true)?;
        }

        Ok(class)
    }

    fn parse_members(
        &self,
        reader: &mut ByteReader<'_>,
        methods: bool,
    ) -> Result<Vec<Member>, ClassFileError> {
        let count = reader.u2()?;
        let mut members = Vec::with_capacity(count as usize);

        for _ in 0..count {
            let pool = &self.constant_pool;
            let mut member = Member {
                access_flags: reader.u2()?,
                name: pool.utf8(reader.u2()?)?.to_string(),
                descriptor: pool.utf8(reader.u2()?)?.to_string(),
                ..Member::default()
            };

            let attribute_count = reader.u2()?;
            for _ in 0..attribute_count {
                let name = pool.utf8(reader.u2()?)?;
                let len = reader.u4()? as usize;
                let body = reader.take(len)?;

                if !methods {
                    continue;
                }
                match name {
                    "Signature" => {
                        let mut attr = ByteReader::new(body);
                        member.signature = Some(pool.utf8(attr.u2()?)?.to_string());
                    }
                    "Exceptions" => {
                        let mut attr = ByteReader::new(body);
                        let n = attr.u2()?;
                        for _ in 0..n {
                            member.exceptions.push(pool.class_name(attr.u2()?)?.to_string());
                        }
                    }
                    "Code" => member.operands = Self::code_operands(body)?,
                    _ => {}
                }
            }

            members.push(member);
        }

        Ok(members)
    }

    fn code_operands(body: &[u8]) -> Result<Vec<Operand>, ClassFileError> {
        let mut attr = ByteReader::new(body);
        let _max_stack = attr.u2()?;
        let _max_locals = attr.u2()?;
        let code_len = attr.u4()? as usize;
        class_operands(attr.take(code_len)?)
    }

    /// Public, or at least not explicitly private
    pub fn is_visible(&self) -> bool {
        self.access_flags & ACC_PUBLIC != 0 || self.access_flags & ACC_PRIVATE == 0
    }

    /// Binary (dot-separated) name of this class
    pub fn binary_name(&self) -> String {
        to_binary_name(&self.this_class)
    }

    /// Every class this class refers to, in binary form.
    ///
    /// Covers supertypes, field and method descriptors, method signatures
    /// and thrown exceptions, and the operands of type, field and method
    /// instructions. Array types and empty names are dropped.
    pub fn referenced_classes(&self) -> Result<HashSet<String>, ClassFileError> {
        let mut refs: Vec<String> = Vec::new();

        if let Some(super_class) = &self.super_class {
            refs.push(to_binary_name(super_class));
        }
        refs.extend(self.interfaces.iter().map(|i| to_binary_name(i)));

        for field in &self.fields {
            refs.extend(object_types(&field.descriptor));
        }

        for method in &self.methods {
            refs.extend(object_types(&method.descriptor));
            if let Some(signature) = &method.signature {
                refs.extend(signature_types(signature));
            }
            refs.extend(method.exceptions.iter().map(|e| to_binary_name(e)));

            for operand in &method.operands {
                match *operand {
                    Operand::Type(index) => {
                        refs.push(to_binary_name(self.constant_pool.class_name(index)?));
                    }
                    Operand::Field(index) | Operand::Method(index) => {
                        let member = self.constant_pool.member_ref(index)?;
                        refs.push(to_binary_name(member.owner));
                        refs.extend(object_types(member.descriptor));
                    }
                }
            }
        }

        Ok(refs
            .into_iter()
            .filter(|name| !name.is_empty() && !name.starts_with('['))
            .collect())
    }
}

/// Name, visibility and references of one compiled class
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassSummary {
    pub name: String,
    pub visible: bool,
    pub referenced_classes: HashSet<String>,
}

impl ClassSummary {
    /// Summarize a class file. Parse failures are returned to the caller,
    /// which decides whether to skip the file.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ClassFileError> {
        let class = ClassFile::parse(bytes)?;
        Ok(Self {
            name: class.binary_name(),
            visible: class.is_visible(),
            referenced_classes: class.referenced_classes()?,
        })
    }
}

/// Referenced classes of a class file; empty if the file does not parse
pub fn extract_references(bytes: &[u8]) -> HashSet<String> {
    ClassFile::parse(bytes)
        .and_then(|class| class.referenced_classes())
        .unwrap_or_default()
}

/// Visibility of a class file; "not visible" if the header does not parse
pub fn is_visible_class(bytes: &[u8]) -> bool {
    ClassFile::parse_header(bytes)
        .map(|class| class.is_visible())
        .unwrap_or(false)
}
