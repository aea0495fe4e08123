//! Prompt construction
//!
//! A pure function from contract to prompt text. Identical contracts must
//! produce byte-identical prompts: tests rely on it, and any future
//! caching keyed on prompt content will too.

use crate::contract::FunctionContract;

/// Build the generation prompt for a contract
pub fn build_prompt(contract: &FunctionContract) -> String {
    let mut lines: Vec<String> = Vec::new();

    lines.push(
        "You are implementing a single function in a small expression language.".to_string(),
    );
    lines.push(String::new());
    lines.push("The language supports:".to_string());
    lines.push("  - function definitions: fn name(param, param = default) { body }".to_string());
    lines.push("  - let bindings: let x = expr; (inside a block, before its final expression)"
        .to_string());
    lines.push("  - if/else as an expression: if cond { a } else { b }".to_string());
    lines.push(
        "  - arithmetic (+ - * / %), comparisons (== != < <= > >=), boolean && || !".to_string(),
    );
    lines.push("  - int, float, bool, string, nil and list literals; list indexing xs[i]"
        .to_string());
    lines.push(
        "  - record construction Name { field: expr } and field access value.field".to_string(),
    );
    lines.push(
        "  - builtins: len, abs, min, max, str, floor, push, range; recursion is allowed"
            .to_string(),
    );
    lines.push("A block's final expression is its value; there is no return statement."
        .to_string());

    if !contract.referenced_types().is_empty() {
        lines.push(String::new());
        lines.push("Available record types:".to_string());
        for schema in contract.referenced_types() {
            lines.push(format!("  {}", schema));
            for field in schema.fields() {
                if let Some(description) = field.description() {
                    lines.push(format!("    {}: {}", field.name(), description));
                }
            }
        }
    }

    lines.push(String::new());
    lines.push("Implement this function:".to_string());
    lines.push(String::new());
    lines.push(contract.signature());

    if let Some(doc) = contract.docstring() {
        lines.push(String::new());
        lines.push(format!("Behavior: {}", doc));
    }

    if !contract.parameters().is_empty() {
        lines.push(String::new());
        lines.push("Parameter details:".to_string());
        for param in contract.parameters() {
            let mut detail = format!("  - {}: ", param.name);
            match &param.ty {
                Some(ty) => detail.push_str(&ty.to_string()),
                None => detail.push_str("no annotation; infer a sensible type from the behavior"),
            }
            if let Some(description) = &param.description {
                detail.push_str(&format!(" - {}", description));
            }
            if let Some(default) = &param.default {
                detail.push_str(&format!(" (default: {})", default));
            }
            lines.push(detail);
        }
    }

    if let Some(ret) = contract.return_type() {
        lines.push(String::new());
        lines.push(format!("Return type: {}", ret));
        if let Some(description) = contract.return_description() {
            lines.push(format!("  Description: {}", description));
        }
    }

    lines.push(String::new());
    lines.push(format!(
        "Respond with exactly one `fn` definition named `{}`, replicating the \
         signature's parameters and defaults. No prose, no markdown fences, no \
         commentary before or after the code.",
        contract.name()
    ));

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::{RecordSchema, TypeDescriptor};
    use crate::expr::Value;

    fn sample_contract() -> FunctionContract {
        FunctionContract::builder("add")
            .parameter("x", TypeDescriptor::Int)
            .parameter_with_default("y", TypeDescriptor::Int, Value::Int(2))
            .returns(TypeDescriptor::Int)
            .docstring("returns x+y")
            .build()
            .unwrap()
    }

    #[test]
    fn test_prompt_is_deterministic() {
        let contract = sample_contract();
        assert_eq!(build_prompt(&contract), build_prompt(&contract));
    }

    #[test]
    fn test_prompt_embeds_signature_docstring_and_instruction() {
        let prompt = build_prompt(&sample_contract());
        assert!(prompt.contains("fn add(x: int, y: int = 2) -> int"));
        assert!(prompt.contains("Behavior: returns x+y"));
        assert!(prompt.contains("(default: 2)"));
        assert!(prompt.contains("exactly one `fn` definition named `add`"));
    }

    #[test]
    fn test_prompt_embeds_record_schemas() {
        let contract = FunctionContract::builder("shift")
            .parameter("p", TypeDescriptor::Record("Point".to_string()))
            .returns(TypeDescriptor::Record("Point".to_string()))
            .record(
                RecordSchema::new("Point")
                    .field("x", TypeDescriptor::Int)
                    .field("y", TypeDescriptor::Int),
            )
            .build()
            .unwrap();
        let prompt = build_prompt(&contract);
        assert!(prompt.contains("record Point { x: int, y: int }"));
    }

    #[test]
    fn test_prompt_embeds_descriptions() {
        let contract = FunctionContract::builder("distance")
            .parameter_described("a", TypeDescriptor::Record("Point".to_string()), "start point")
            .parameter_described("b", TypeDescriptor::Record("Point".to_string()), "end point")
            .returns_described(TypeDescriptor::Float, "euclidean distance between a and b")
            .record(
                RecordSchema::new("Point")
                    .field_described("x", TypeDescriptor::Int, "horizontal coordinate")
                    .field("y", TypeDescriptor::Int),
            )
            .build()
            .unwrap();

        let prompt = build_prompt(&contract);
        assert!(prompt.contains("- a: Point - start point"));
        assert!(prompt.contains("- b: Point - end point"));
        assert!(prompt.contains("Return type: float"));
        assert!(prompt.contains("  Description: euclidean distance between a and b"));
        assert!(prompt.contains("    x: horizontal coordinate"));
        // Undescribed fields get no extra line.
        assert!(!prompt.contains("    y:"));
        // Still deterministic with descriptions present.
        assert_eq!(prompt, build_prompt(&contract));
    }

    #[test]
    fn test_prompt_distinguishes_untyped_from_any() {
        let untyped = FunctionContract::builder("f")
            .parameter_untyped("x")
            .build()
            .unwrap();
        let any = FunctionContract::builder("f")
            .parameter("x", TypeDescriptor::Any)
            .build()
            .unwrap();

        let untyped_prompt = build_prompt(&untyped);
        let any_prompt = build_prompt(&any);
        assert!(untyped_prompt.contains("no annotation"));
        assert!(any_prompt.contains("- x: any"));
        assert_ne!(untyped_prompt, any_prompt);
    }
}
