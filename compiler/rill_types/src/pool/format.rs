//! Type formatting.
//!
//! Produces the canonical source spelling of a type. Backends use it to
//! name debug descriptors and runtime type handles.

#![allow(clippy::format_push_string)]

use crate::data::{ChanDir, Signature, TypeData, Var};
use crate::{Idx, Pool};

impl Pool {
    /// Format a type as its canonical string.
    pub fn type_string(&self, idx: Idx) -> String {
        let mut buf = String::new();
        self.format_type_into(idx, &mut buf);
        buf
    }

    /// Format a type into an existing buffer.
    pub fn format_type_into(&self, idx: Idx, buf: &mut String) {
        let Some(data) = self.get(idx) else {
            buf.push_str("<none>");
            return;
        };
        match data {
            TypeData::Basic(kind) => buf.push_str(kind.name()),
            TypeData::Pointer(elem) => {
                buf.push('*');
                self.format_type_into(*elem, buf);
            }
            TypeData::Array { elem, len } => {
                buf.push_str(&format!("[{len}]"));
                self.format_type_into(*elem, buf);
            }
            TypeData::Slice(elem) => {
                buf.push_str("[]");
                self.format_type_into(*elem, buf);
            }
            TypeData::Map { key, value } => {
                buf.push_str("map[");
                self.format_type_into(*key, buf);
                buf.push(']');
                self.format_type_into(*value, buf);
            }
            TypeData::Chan { elem, dir } => {
                buf.push_str(match dir {
                    ChanDir::Both => "chan ",
                    ChanDir::SendOnly => "chan<- ",
                    ChanDir::RecvOnly => "<-chan ",
                });
                self.format_type_into(*elem, buf);
            }
            TypeData::Struct(fields) => {
                buf.push_str("struct{");
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        buf.push_str("; ");
                    }
                    if !field.embedded {
                        buf.push_str(&field.name);
                        buf.push(' ');
                    }
                    self.format_type_into(field.ty, buf);
                }
                buf.push('}');
            }
            TypeData::Interface(methods) => {
                buf.push_str("interface{");
                for (i, method) in methods.iter().enumerate() {
                    if i > 0 {
                        buf.push_str("; ");
                    }
                    buf.push_str(&method.name);
                    match self.signature_of(method.sig) {
                        Some(sig) => self.format_signature_into(sig, buf),
                        None => buf.push_str("<none>"),
                    }
                }
                buf.push('}');
            }
            TypeData::Signature(sig) => {
                buf.push_str("func");
                self.format_signature_into(sig, buf);
            }
            TypeData::Tuple(vars) => self.format_vars_into(vars, false, buf),
            TypeData::Named { decl, .. } => {
                if !decl.package.is_empty() {
                    buf.push_str(&decl.package);
                    buf.push('.');
                }
                buf.push_str(&decl.name);
            }
        }
    }

    fn format_signature_into(&self, sig: &Signature, buf: &mut String) {
        self.format_vars_into(&sig.params, sig.variadic, buf);
        match sig.results.as_slice() {
            [] => {}
            [only] if only.name.is_empty() => {
                buf.push(' ');
                self.format_type_into(only.ty, buf);
            }
            results => {
                buf.push(' ');
                self.format_vars_into(results, false, buf);
            }
        }
    }

    fn format_vars_into(&self, vars: &[Var], variadic: bool, buf: &mut String) {
        buf.push('(');
        for (i, var) in vars.iter().enumerate() {
            if i > 0 {
                buf.push_str(", ");
            }
            if !var.name.is_empty() {
                buf.push_str(&var.name);
                buf.push(' ');
            }
            let last = i + 1 == vars.len();
            match self.get(var.ty) {
                Some(TypeData::Slice(elem)) if variadic && last => {
                    buf.push_str("...");
                    self.format_type_into(*elem, buf);
                }
                _ => self.format_type_into(var.ty, buf),
            }
        }
        buf.push(')');
    }
}
