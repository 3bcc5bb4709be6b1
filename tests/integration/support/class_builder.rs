//! Assembles minimal but well-formed class files for tests.
//!
//! Shared by the integration tests and the crate's own unit tests.

#![allow(dead_code)]

use std::collections::HashMap;

const ACC_PUBLIC: u16 = 0x0001;
const ACC_SUPER: u16 = 0x0020;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Entry {
    Utf8(String),
    Class(u16),
    NameAndType(u16, u16),
    FieldRef(u16, u16),
    MethodRef(u16, u16),
}

#[derive(Default)]
struct Pool {
    entries: Vec<Entry>,
    index: HashMap<Entry, u16>,
}

impl Pool {
    fn add(&mut self, entry: Entry) -> u16 {
        if let Some(&i) = self.index.get(&entry) {
            return i;
        }
        self.entries.push(entry.clone());
        let i = self.entries.len() as u16;
        self.index.insert(entry, i);
        i
    }

    fn utf8(&mut self, value: &str) -> u16 {
        self.add(Entry::Utf8(value.to_string()))
    }

    fn class(&mut self, name: &str) -> u16 {
        let name = self.utf8(name);
        self.add(Entry::Class(name))
    }

    fn member(&mut self, field: bool, owner: &str, name: &str, descriptor: &str) -> u16 {
        let owner = self.class(owner);
        let name = self.utf8(name);
        let descriptor = self.utf8(descriptor);
        let nat = self.add(Entry::NameAndType(name, descriptor));
        if field {
            self.add(Entry::FieldRef(owner, nat))
        } else {
            self.add(Entry::MethodRef(owner, nat))
        }
    }

    fn write(&self, out: &mut Vec<u8>) {
        push_u2(out, self.entries.len() as u16 + 1);
        for entry in &self.entries {
            match entry {
                Entry::Utf8(value) => {
                    out.push(1);
                    push_u2(out, value.len() as u16);
                    out.extend_from_slice(value.as_bytes());
                }
                Entry::Class(name) => {
                    out.push(7);
                    push_u2(out, *name);
                }
                Entry::NameAndType(name, descriptor) => {
                    out.push(12);
                    push_u2(out, *name);
                    push_u2(out, *descriptor);
                }
                Entry::FieldRef(class, nat) => {
                    out.push(9);
                    push_u2(out, *class);
                    push_u2(out, *nat);
                }
                Entry::MethodRef(class, nat) => {
                    out.push(10);
                    push_u2(out, *class);
                    push_u2(out, *nat);
                }
            }
        }
    }
}

fn push_u2(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_be_bytes());
}

fn push_u4(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_be_bytes());
}

enum Insn {
    Type(u8, String),
    Field(u8, String, String, String),
    Method(u8, String, String, String),
}

/// Body of one method under construction
#[derive(Default)]
pub struct MethodBuilder {
    signature: Option<String>,
    throws: Vec<String>,
    code: Vec<Insn>,
}

impl MethodBuilder {
    pub fn signature(mut self, signature: &str) -> Self {
        self.signature = Some(signature.to_string());
        self
    }

    pub fn throws(mut self, class: &str) -> Self {
        self.throws.push(class.to_string());
        self
    }

    pub fn new_instance(mut self, class: &str) -> Self {
        self.code.push(Insn::Type(0xbb, class.to_string()));
        self
    }

    pub fn check_cast(mut self, class: &str) -> Self {
        self.code.push(Insn::Type(0xc0, class.to_string()));
        self
    }

    pub fn instance_of(mut self, class: &str) -> Self {
        self.code.push(Insn::Type(0xc1, class.to_string()));
        self
    }

    pub fn get_static(mut self, owner: &str, name: &str, descriptor: &str) -> Self {
        self.code.push(Insn::Field(0xb2, owner.into(), name.into(), descriptor.into()));
        self
    }

    pub fn invoke(mut self, owner: &str, name: &str, descriptor: &str) -> Self {
        self.code.push(Insn::Method(0xb6, owner.into(), name.into(), descriptor.into()));
        self
    }

    pub fn invoke_static(mut self, owner: &str, name: &str, descriptor: &str) -> Self {
        self.code.push(Insn::Method(0xb8, owner.into(), name.into(), descriptor.into()));
        self
    }
}

struct MemberDef {
    name: String,
    descriptor: String,
    body: Option<MethodBuilder>,
}

/// Builder for a single class file
pub struct ClassBuilder {
    name: String,
    access: u16,
    super_class: Option<String>,
    interfaces: Vec<String>,
    fields: Vec<MemberDef>,
    methods: Vec<MemberDef>,
}

impl ClassBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            access: ACC_PUBLIC | ACC_SUPER,
            super_class: Some("java/lang/Object".to_string()),
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
        }
    }

    pub fn access(mut self, access: u16) -> Self {
        self.access = access;
        self
    }

    pub fn super_class(mut self, name: &str) -> Self {
        self.super_class = Some(name.to_string());
        self
    }

    pub fn interface(mut self, name: &str) -> Self {
        self.interfaces.push(name.to_string());
        self
    }

    pub fn field(mut self, name: &str, descriptor: &str) -> Self {
        self.fields.push(MemberDef {
            name: name.to_string(),
            descriptor: descriptor.to_string(),
            body: None,
        });
        self
    }

    /// Abstract-style method with no attributes
    pub fn method(mut self, name: &str, descriptor: &str) -> Self {
        self.methods.push(MemberDef {
            name: name.to_string(),
            descriptor: descriptor.to_string(),
            body: None,
        });
        self
    }

    pub fn method_with<F>(mut self, name: &str, descriptor: &str, f: F) -> Self
    where
        F: FnOnce(MethodBuilder) -> MethodBuilder,
    {
        self.methods.push(MemberDef {
            name: name.to_string(),
            descriptor: descriptor.to_string(),
            body: Some(f(MethodBuilder::default())),
        });
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut pool = Pool::default();
        let this_class = pool.class(&self.name);
        let super_class = self.super_class.as_deref().map(|s| pool.class(s)).unwrap_or(0);
        let interfaces: Vec<u16> = self.interfaces.iter().map(|i| pool.class(i)).collect();

        let fields: Vec<Vec<u8>> = self
            .fields
            .iter()
            .map(|f| member_bytes(&mut pool, f))
            .collect();
        let methods: Vec<Vec<u8>> = self
            .methods
            .iter()
            .map(|m| member_bytes(&mut pool, m))
            .collect();

        let mut out = Vec::new();
        push_u4(&mut out, 0xCAFE_BABE);
        push_u2(&mut out, 0);
        push_u2(&mut out, 52);
        pool.write(&mut out);
        push_u2(&mut out, self.access);
        push_u2(&mut out, this_class);
        push_u2(&mut out, super_class);
        push_u2(&mut out, interfaces.len() as u16);
        for i in interfaces {
            push_u2(&mut out, i);
        }
        push_u2(&mut out, fields.len() as u16);
        for f in fields {
            out.extend(f);
        }
        push_u2(&mut out, methods.len() as u16);
        for m in methods {
            out.extend(m);
        }
        // class attributes
        push_u2(&mut out, 0);
        out
    }
}

fn member_bytes(pool: &mut Pool, def: &MemberDef) -> Vec<u8> {
    let mut out = Vec::new();
    push_u2(&mut out, ACC_PUBLIC);
    push_u2(&mut out, pool.utf8(&def.name));
    push_u2(&mut out, pool.utf8(&def.descriptor));

    let Some(body) = &def.body else {
        push_u2(&mut out, 0);
        return out;
    };

    let mut attributes: Vec<(u16, Vec<u8>)> = Vec::new();

    if let Some(signature) = &body.signature {
        let name = pool.utf8("Signature");
        let mut attr = Vec::new();
        push_u2(&mut attr, pool.utf8(signature));
        attributes.push((name, attr));
    }

    if !body.throws.is_empty() {
        let name = pool.utf8("Exceptions");
        let mut attr = Vec::new();
        push_u2(&mut attr, body.throws.len() as u16);
        for class in &body.throws {
            push_u2(&mut attr, pool.class(class));
        }
        attributes.push((name, attr));
    }

    let mut code = Vec::new();
    for insn in &body.code {
        match insn {
            Insn::Type(op, class) => {
                code.push(*op);
                push_u2(&mut code, pool.class(class));
            }
            Insn::Field(op, owner, name, descriptor) => {
                code.push(*op);
                push_u2(&mut code, pool.member(true, owner, name, descriptor));
            }
            Insn::Method(op, owner, name, descriptor) => {
                code.push(*op);
                push_u2(&mut code, pool.member(false, owner, name, descriptor));
            }
        }
    }
    code.push(0xb1);

    let name = pool.utf8("Code");
    let mut attr = Vec::new();
    push_u2(&mut attr, 4);
    push_u2(&mut attr, 4);
    push_u4(&mut attr, code.len() as u32);
    attr.extend(code);
    push_u2(&mut attr, 0);
    push_u2(&mut attr, 0);
    attributes.push((name, attr));

    push_u2(&mut out, attributes.len() as u16);
    for (name, body) in attributes {
        push_u2(&mut out, name);
        push_u4(&mut out, body.len() as u32);
        out.extend(body);
    }
    out
}
