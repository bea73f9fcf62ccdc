//! Textual dump of an `IrModule`, LLVM-flavoured.

use std::fmt::{self, Display, Formatter};

use super::{DebugLoc, Function, InstKind, IrModule, IrType, Terminator, ValueId, ValueKind};

impl Display for IrType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            IrType::Void => f.write_str("void"),
            IrType::Int(bits) => write!(f, "i{bits}"),
            IrType::Float(32) => f.write_str("float"),
            IrType::Float(64) => f.write_str("double"),
            IrType::Float(bits) => write!(f, "f{bits}"),
            IrType::Ptr => f.write_str("ptr"),
            IrType::Struct(fields) => {
                f.write_str("{ ")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{field}")?;
                }
                f.write_str(" }")
            }
            IrType::Array(elem, len) => write!(f, "[{len} x {elem}]"),
        }
    }
}

struct Val<'m>(&'m IrModule, ValueId);

impl Display for Val<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let data = self.0.value(self.1);
        match &data.kind {
            ValueKind::Const(v) => write!(f, "{} {v}", data.ty),
            ValueKind::Global(g) => write!(f, "ptr @{}", self.0.global(*g).name),
            ValueKind::Param(..) | ValueKind::Inst => {
                if data.name.is_empty() {
                    write!(f, "{} %{}", data.ty, self.1.raw())
                } else {
                    write!(f, "{} %{}.{}", data.ty, data.name, self.1.raw())
                }
            }
        }
    }
}

/// Destination name without the type prefix.
struct Dest<'m>(&'m IrModule, ValueId);

impl Display for Dest<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let data = self.0.value(self.1);
        if data.name.is_empty() {
            write!(f, "%{}", self.1.raw())
        } else {
            write!(f, "%{}.{}", data.name, self.1.raw())
        }
    }
}

fn write_loc(f: &mut Formatter<'_>, loc: Option<DebugLoc>) -> fmt::Result {
    match loc {
        Some(loc) => write!(
            f,
            ", !dbg(line: {}, column: {}, scope: {})",
            loc.line, loc.column, loc.scope
        ),
        None => Ok(()),
    }
}

fn write_function(f: &mut Formatter<'_>, m: &IrModule, func: &Function) -> fmt::Result {
    let keyword = if func.is_declaration() {
        "declare"
    } else {
        "define"
    };
    write!(f, "{keyword} {} @{}(", func.ret, func.name)?;
    for (i, p) in func.params.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{p}")?;
    }
    f.write_str(")")?;
    if let Some(sp) = func.subprogram {
        write!(f, " !dbg {sp}")?;
    }
    if func.is_declaration() {
        return writeln!(f);
    }
    writeln!(f, " {{")?;
    for block in &func.blocks {
        writeln!(f, "{}:", block.name)?;
        for inst in &block.instructions {
            f.write_str("  ")?;
            match &inst.kind {
                InstKind::Alloca { dest, ty } => write!(f, "{} = alloca {ty}", Dest(m, *dest))?,
                InstKind::Store { value, ptr } => {
                    write!(f, "store {}, {}", Val(m, *value), Val(m, *ptr))?;
                }
                InstKind::Load { dest, ptr } => write!(
                    f,
                    "{} = load {}, {}",
                    Dest(m, *dest),
                    m.value(*dest).ty,
                    Val(m, *ptr)
                )?,
                InstKind::Convert { dest, value } => write!(
                    f,
                    "{} = convert {} to {}",
                    Dest(m, *dest),
                    Val(m, *value),
                    m.value(*dest).ty
                )?,
                InstKind::Call { dest, callee, args } => {
                    let callee = m.function(*callee);
                    if let Some(dest) = dest {
                        write!(f, "{} = ", Dest(m, *dest))?;
                    }
                    write!(f, "call {} @{}(", callee.ret, callee.name)?;
                    for (i, a) in args.iter().enumerate() {
                        if i > 0 {
                            f.write_str(", ")?;
                        }
                        write!(f, "{}", Val(m, *a))?;
                    }
                    f.write_str(")")?;
                }
                InstKind::DbgDeclare {
                    storage,
                    variable,
                    expr,
                } => write!(
                    f,
                    "dbg.declare({}, {variable}, {expr})",
                    Val(m, *storage)
                )?,
            }
            write_loc(f, inst.loc)?;
            writeln!(f)?;
        }
        match &block.terminator {
            Some(Terminator::Ret(Some(v))) => writeln!(f, "  ret {}", Val(m, *v))?,
            Some(Terminator::Ret(None)) => writeln!(f, "  ret void")?,
            Some(Terminator::Br(dest)) => {
                writeln!(f, "  br label %{}", func.block(*dest).name)?;
            }
            None => {}
        }
    }
    writeln!(f, "}}")
}

impl Display for IrModule {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "; module {}", self.name)?;
        for global in &self.globals {
            writeln!(f, "@{} = external global", global.name)?;
        }
        for func in &self.functions {
            writeln!(f)?;
            write_function(f, self, func)?;
        }
        if let Some(debug) = &self.debug {
            writeln!(f)?;
            write!(f, "{debug}")?;
        }
        Ok(())
    }
}
