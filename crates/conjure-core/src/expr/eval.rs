//! Tree-walking evaluator for admitted programs
//!
//! The evaluator is the closed world in which generated code runs: it can
//! reach the program's own functions, a fixed builtin set and the record
//! schemas seeded from the contract, and nothing else. Recursion is
//! allowed up to [`CALL_DEPTH_LIMIT`].

use super::ast::{BinaryOp, Block, Expr, Program, UnaryOp};
use super::value::Value;
use crate::contract::RecordSchema;
use crate::error::EvalError;
use std::collections::{BTreeMap, HashMap};

/// Maximum nesting of function calls before evaluation is aborted
pub const CALL_DEPTH_LIMIT: usize = 64;

/// Evaluates expressions against a program and a set of record schemas
#[derive(Debug)]
pub struct Evaluator<'a> {
    program: &'a Program,
    schemas: &'a HashMap<String, RecordSchema>,
}

/// Lexically scoped bindings for one function frame
struct Env {
    scopes: Vec<HashMap<String, Value>>,
}

impl Env {
    fn new() -> Self {
        Self {
            scopes: vec![HashMap::new()],
        }
    }

    fn push(&mut self) {
        self.scopes.push(HashMap::new());
    }

    fn pop(&mut self) {
        self.scopes.pop();
    }

    fn set(&mut self, name: String, value: Value) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name, value);
        }
    }

    fn get(&self, name: &str) -> Option<&Value> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }
}

impl<'a> Evaluator<'a> {
    pub fn new(program: &'a Program, schemas: &'a HashMap<String, RecordSchema>) -> Self {
        Self { program, schemas }
    }

    /// Call a function defined in the program with positional arguments
    pub fn call(&self, name: &str, args: Vec<Value>) -> Result<Value, EvalError> {
        self.call_function(name, args, 0)
    }

    fn call_function(
        &self,
        name: &str,
        args: Vec<Value>,
        depth: usize,
    ) -> Result<Value, EvalError> {
        if depth >= CALL_DEPTH_LIMIT {
            return Err(EvalError::CallDepthExceeded(CALL_DEPTH_LIMIT));
        }

        let Some(def) = self.program.get(name) else {
            return self.call_builtin(name, args);
        };

        if args.len() > def.params.len() {
            return Err(EvalError::Arity {
                name: name.to_string(),
                expected: def.params.len(),
                got: args.len(),
            });
        }

        let mut env = Env::new();
        for (i, param) in def.params.iter().enumerate() {
            let value = if i < args.len() {
                args[i].clone()
            } else {
                match &param.default {
                    Some(default) => default.clone(),
                    None => {
                        return Err(EvalError::MissingArgument {
                            function: name.to_string(),
                            argument: param.name.clone(),
                        })
                    }
                }
            };
            env.set(param.name.clone(), value);
        }

        self.eval_block(&def.body, &mut env, depth)
    }

    fn eval_block(&self, block: &Block, env: &mut Env, depth: usize) -> Result<Value, EvalError> {
        env.push();
        let mut result = Ok(Value::Nil);
        for (name, expr) in &block.lets {
            match self.eval_expr(expr, env, depth) {
                Ok(value) => env.set(name.clone(), value),
                Err(e) => {
                    result = Err(e);
                    break;
                }
            }
        }
        if result.is_ok() {
            result = self.eval_expr(&block.value, env, depth);
        }
        env.pop();
        result
    }

    fn eval_expr(&self, expr: &Expr, env: &mut Env, depth: usize) -> Result<Value, EvalError> {
        match expr {
            Expr::Literal(value) => Ok(value.clone()),

            Expr::Var(name) => env
                .get(name)
                .cloned()
                .ok_or_else(|| EvalError::UnknownIdentifier(name.clone())),

            Expr::Unary { op, expr } => {
                let value = self.eval_expr(expr, env, depth)?;
                match (op, value) {
                    (UnaryOp::Neg, Value::Int(v)) => v
                        .checked_neg()
                        .map(Value::Int)
                        .ok_or_else(|| EvalError::IntegerOverflow("-".to_string())),
                    (UnaryOp::Neg, Value::Float(v)) => Ok(Value::Float(-v)),
                    (UnaryOp::Neg, other) => Err(EvalError::TypeMismatch(format!(
                        "cannot negate {}",
                        other.type_name()
                    ))),
                    (UnaryOp::Not, Value::Bool(b)) => Ok(Value::Bool(!b)),
                    (UnaryOp::Not, other) => Err(EvalError::TypeMismatch(format!(
                        "'!' expects bool, got {}",
                        other.type_name()
                    ))),
                }
            }

            Expr::Binary { op, lhs, rhs } => match op {
                BinaryOp::And | BinaryOp::Or => {
                    let left = self.eval_expr(lhs, env, depth)?;
                    let Value::Bool(left) = left else {
                        return Err(EvalError::TypeMismatch(format!(
                            "'{}' expects bool operands, got {}",
                            op.symbol(),
                            left.type_name()
                        )));
                    };
                    // Short-circuit
                    if (*op == BinaryOp::And && !left) || (*op == BinaryOp::Or && left) {
                        return Ok(Value::Bool(left));
                    }
                    let right = self.eval_expr(rhs, env, depth)?;
                    match right {
                        Value::Bool(right) => Ok(Value::Bool(right)),
                        other => Err(EvalError::TypeMismatch(format!(
                            "'{}' expects bool operands, got {}",
                            op.symbol(),
                            other.type_name()
                        ))),
                    }
                }
                _ => {
                    let left = self.eval_expr(lhs, env, depth)?;
                    let right = self.eval_expr(rhs, env, depth)?;
                    apply_binary(*op, left, right)
                }
            },

            Expr::If {
                cond,
                then,
                otherwise,
            } => match self.eval_expr(cond, env, depth)? {
                Value::Bool(true) => self.eval_block(then, env, depth),
                Value::Bool(false) => self.eval_block(otherwise, env, depth),
                other => Err(EvalError::TypeMismatch(format!(
                    "if condition must be bool, got {}",
                    other.type_name()
                ))),
            },

            Expr::Call { name, args } => {
                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    values.push(self.eval_expr(arg, env, depth)?);
                }
                self.call_function(name, values, depth + 1)
            }

            Expr::List(items) => {
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    values.push(self.eval_expr(item, env, depth)?);
                }
                Ok(Value::List(values))
            }

            Expr::Index { list, index } => {
                let target = self.eval_expr(list, env, depth)?;
                let index_value = self.eval_expr(index, env, depth)?;
                let Value::Int(i) = index_value else {
                    return Err(EvalError::TypeMismatch(format!(
                        "list index must be int, got {}",
                        index_value.type_name()
                    )));
                };
                let Value::List(items) = target else {
                    return Err(EvalError::TypeMismatch(format!(
                        "cannot index {}",
                        target.type_name()
                    )));
                };
                if i < 0 || i as usize >= items.len() {
                    return Err(EvalError::IndexOutOfBounds {
                        index: i,
                        len: items.len(),
                    });
                }
                Ok(items[i as usize].clone())
            }

            Expr::RecordLit { name, fields } => {
                let Some(schema) = self.schemas.get(name) else {
                    return Err(EvalError::UnknownRecord(name.clone()));
                };
                let mut values: BTreeMap<String, Value> = BTreeMap::new();
                for (field, expr) in fields {
                    if values.contains_key(field) {
                        return Err(EvalError::RecordMismatch {
                            record: name.clone(),
                            detail: format!("field '{}' given twice", field),
                        });
                    }
                    if !schema.has_field(field) {
                        return Err(EvalError::RecordMismatch {
                            record: name.clone(),
                            detail: format!("unknown field '{}'", field),
                        });
                    }
                    values.insert(field.clone(), self.eval_expr(expr, env, depth)?);
                }
                for field in schema.fields() {
                    if !values.contains_key(field.name()) {
                        return Err(EvalError::RecordMismatch {
                            record: name.clone(),
                            detail: format!("missing field '{}'", field.name()),
                        });
                    }
                }
                Ok(Value::Record {
                    schema: name.clone(),
                    fields: values,
                })
            }

            Expr::Field { expr, field } => {
                let value = self.eval_expr(expr, env, depth)?;
                match value {
                    Value::Record { schema, fields } => {
                        fields
                            .get(field)
                            .cloned()
                            .ok_or_else(|| EvalError::UnknownField {
                                field: field.clone(),
                                value: schema,
                            })
                    }
                    other => Err(EvalError::UnknownField {
                        field: field.clone(),
                        value: other.type_name().to_string(),
                    }),
                }
            }
        }
    }

    fn call_builtin(&self, name: &str, args: Vec<Value>) -> Result<Value, EvalError> {
        let arity = |expected: usize| -> Result<(), EvalError> {
            if args.len() == expected {
                Ok(())
            } else {
                Err(EvalError::Arity {
                    name: name.to_string(),
                    expected,
                    got: args.len(),
                })
            }
        };

        match name {
            "len" => {
                arity(1)?;
                match &args[0] {
                    Value::Str(s) => Ok(Value::Int(s.chars().count() as i64)),
                    Value::List(items) => Ok(Value::Int(items.len() as i64)),
                    other => Err(EvalError::TypeMismatch(format!(
                        "len expects str or list, got {}",
                        other.type_name()
                    ))),
                }
            }
            "abs" => {
                arity(1)?;
                match &args[0] {
                    Value::Int(v) => v
                        .checked_abs()
                        .map(Value::Int)
                        .ok_or_else(|| EvalError::IntegerOverflow("abs".to_string())),
                    Value::Float(v) => Ok(Value::Float(v.abs())),
                    other => Err(EvalError::TypeMismatch(format!(
                        "abs expects a number, got {}",
                        other.type_name()
                    ))),
                }
            }
            "min" | "max" => {
                arity(2)?;
                let pick_left = {
                    let ordering = compare_numbers(name, &args[0], &args[1])?;
                    if name == "min" {
                        ordering != std::cmp::Ordering::Greater
                    } else {
                        ordering != std::cmp::Ordering::Less
                    }
                };
                Ok(if pick_left {
                    args[0].clone()
                } else {
                    args[1].clone()
                })
            }
            "str" => {
                arity(1)?;
                match &args[0] {
                    Value::Str(s) => Ok(Value::Str(s.clone())),
                    other => Ok(Value::Str(other.to_string())),
                }
            }
            "floor" => {
                arity(1)?;
                match &args[0] {
                    Value::Int(v) => Ok(Value::Int(*v)),
                    Value::Float(v) => Ok(Value::Int(v.floor() as i64)),
                    other => Err(EvalError::TypeMismatch(format!(
                        "floor expects a number, got {}",
                        other.type_name()
                    ))),
                }
            }
            "push" => {
                arity(2)?;
                match &args[0] {
                    Value::List(items) => {
                        let mut items = items.clone();
                        items.push(args[1].clone());
                        Ok(Value::List(items))
                    }
                    other => Err(EvalError::TypeMismatch(format!(
                        "push expects a list, got {}",
                        other.type_name()
                    ))),
                }
            }
            "range" => {
                arity(2)?;
                match (&args[0], &args[1]) {
                    (Value::Int(a), Value::Int(b)) => {
                        Ok(Value::List((*a..*b).map(Value::Int).collect()))
                    }
                    _ => Err(EvalError::TypeMismatch(
                        "range expects two ints".to_string(),
                    )),
                }
            }
            _ => Err(EvalError::UnknownFunction(name.to_string())),
        }
    }
}

fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Int(v) => Some(*v as f64),
        Value::Float(v) => Some(*v),
        _ => None,
    }
}

fn compare_numbers(
    context: &str,
    left: &Value,
    right: &Value,
) -> Result<std::cmp::Ordering, EvalError> {
    match (numeric(left), numeric(right)) {
        (Some(l), Some(r)) => Ok(l.partial_cmp(&r).unwrap_or(std::cmp::Ordering::Equal)),
        _ => Err(EvalError::TypeMismatch(format!(
            "'{}' expects numbers, got {} and {}",
            context,
            left.type_name(),
            right.type_name()
        ))),
    }
}

fn apply_binary(op: BinaryOp, left: Value, right: Value) -> Result<Value, EvalError> {
    use BinaryOp::*;

    match op {
        Eq => return Ok(Value::Bool(values_equal(&left, &right))),
        NotEq => return Ok(Value::Bool(!values_equal(&left, &right))),
        _ => {}
    }

    if matches!(op, Lt | LtEq | Gt | GtEq) {
        let ordering = match (&left, &right) {
            (Value::Str(l), Value::Str(r)) => l.cmp(r),
            _ => compare_numbers(op.symbol(), &left, &right)?,
        };
        let result = match op {
            Lt => ordering == std::cmp::Ordering::Less,
            LtEq => ordering != std::cmp::Ordering::Greater,
            Gt => ordering == std::cmp::Ordering::Greater,
            GtEq => ordering != std::cmp::Ordering::Less,
            _ => unreachable!("comparison operator"),
        };
        return Ok(Value::Bool(result));
    }

    match (op, &left, &right) {
        (Add, Value::Int(l), Value::Int(r)) => l
            .checked_add(*r)
            .map(Value::Int)
            .ok_or_else(|| EvalError::IntegerOverflow("+".to_string())),
        (Sub, Value::Int(l), Value::Int(r)) => l
            .checked_sub(*r)
            .map(Value::Int)
            .ok_or_else(|| EvalError::IntegerOverflow("-".to_string())),
        (Mul, Value::Int(l), Value::Int(r)) => l
            .checked_mul(*r)
            .map(Value::Int)
            .ok_or_else(|| EvalError::IntegerOverflow("*".to_string())),
        (Div, Value::Int(l), Value::Int(r)) => {
            if *r == 0 {
                Err(EvalError::DivisionByZero)
            } else {
                l.checked_div(*r)
                    .map(Value::Int)
                    .ok_or_else(|| EvalError::IntegerOverflow("/".to_string()))
            }
        }
        (Rem, Value::Int(l), Value::Int(r)) => {
            if *r == 0 {
                Err(EvalError::DivisionByZero)
            } else {
                l.checked_rem(*r)
                    .map(Value::Int)
                    .ok_or_else(|| EvalError::IntegerOverflow("%".to_string()))
            }
        }
        (Add, Value::Str(l), Value::Str(r)) => Ok(Value::Str(format!("{}{}", l, r))),
        (Add, Value::List(l), Value::List(r)) => {
            let mut items = l.clone();
            items.extend(r.iter().cloned());
            Ok(Value::List(items))
        }
        (Add | Sub | Mul | Div | Rem, _, _) => {
            match (numeric(&left), numeric(&right)) {
                (Some(l), Some(r)) => {
                    let result = match op {
                        Add => l + r,
                        Sub => l - r,
                        Mul => l * r,
                        Div => l / r,
                        Rem => l % r,
                        _ => unreachable!("arithmetic operator"),
                    };
                    Ok(Value::Float(result))
                }
                _ => Err(EvalError::TypeMismatch(format!(
                    "'{}' cannot combine {} and {}",
                    op.symbol(),
                    left.type_name(),
                    right.type_name()
                ))),
            }
        }
        _ => Err(EvalError::TypeMismatch(format!(
            "'{}' cannot combine {} and {}",
            op.symbol(),
            left.type_name(),
            right.type_name()
        ))),
    }
}

/// Equality with numeric promotion, so `1 == 1.0` holds
fn values_equal(left: &Value, right: &Value) -> bool {
    match (numeric(left), numeric(right)) {
        (Some(l), Some(r)) => l == r,
        _ => left == right,
    }
}
