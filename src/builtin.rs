use std::cell::RefCell;
use std::fmt;
use std::fmt::Formatter;
use std::io::Write;
use std::rc::Rc;

use crate::interpreter::RuntimeError;
use crate::object::Object;
use crate::scope::Scope;

/// Shared handle to the stream the printing built-ins write to.
pub type Output = Rc<RefCell<dyn Write>>;

type HostFn = Rc<dyn Fn(&[Object]) -> Result<Option<Object>, RuntimeError>>;

/// A host function exposed to Gosling programs.
#[derive(Clone)]
pub struct BuiltinFunction {
    name: &'static str,
    func: HostFn,
}

impl BuiltinFunction {
    fn new(name: &'static str, func: HostFn) -> Self {
        BuiltinFunction { name, func }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Invokes the host function with the evaluated arguments.
    pub fn call(&self, args: &[Object]) -> Result<Option<Object>, RuntimeError> {
        (self.func)(args)
    }
}

impl fmt::Display for BuiltinFunction {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl fmt::Debug for BuiltinFunction {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "BuiltinFunction({})", self.name)
    }
}

impl PartialEq for BuiltinFunction {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

fn render_args(args: &[Object]) -> String {
    let rendered: Vec<String> = args.iter().map(ToString::to_string).collect();
    rendered.join(" ")
}

fn print_builtin(out: Output) -> BuiltinFunction {
    BuiltinFunction::new(
        "print",
        Rc::new(move |args| {
            write!(out.borrow_mut(), "{}", render_args(args))
                .map_err(|err| RuntimeError::new(format!("print: {}", err)))?;
            Ok(None)
        }),
    )
}

fn println_builtin(out: Output) -> BuiltinFunction {
    BuiltinFunction::new(
        "println",
        Rc::new(move |args| {
            writeln!(out.borrow_mut(), "{}", render_args(args))
                .map_err(|err| RuntimeError::new(format!("println: {}", err)))?;
            Ok(None)
        }),
    )
}

fn len_builtin() -> BuiltinFunction {
    BuiltinFunction::new(
        "len",
        Rc::new(|args| {
            if args.len() != 1 {
                return Err(RuntimeError::new(format!(
                    "len: expected 1 argument, got {}",
                    args.len()
                )));
            }
            match &args[0] {
                Object::String(value) => Ok(Some(Object::Integer(value.len() as i64))),
                other => Err(RuntimeError::new(format!(
                    "len: unexpected argument type {}",
                    other.object_type()
                ))),
            }
        }),
    )
}

/// Returns a scope of predeclared identifiers whose printing built-ins write
/// to `out`.
pub fn builtin_scope(out: Output) -> Scope {
    let mut scope = Scope::new(None);
    scope.set("print", Object::Builtin(print_builtin(Rc::clone(&out))));
    scope.set("println", Object::Builtin(println_builtin(out)));
    scope.set("len", Object::Builtin(len_builtin()));
    scope
}
