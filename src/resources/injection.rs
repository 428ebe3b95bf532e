//! Assembly of self-contained Javascript from a resolved resource and a [`ScriptletSource`].
//!
//! The output is the resource's function declaration, followed by every helper it depends on,
//! followed by a call that applies the function to `[source, ...args]`. Scriptlets are then
//! either wrapped in an anonymous `function(source, args)` (for the `corelibs` engine) or in an
//! immediately invoked function expression with `source` and `args` serialized as JSON.

use crate::resources::{ResourceStorage, ScriptletDefinition, ScriptletSource};

/// Builds injectable code for a scriptlet resolved from `source`.
pub fn assemble_scriptlet(
    storage: &ResourceStorage,
    definition: &ScriptletDefinition,
    source: &ScriptletSource,
) -> Result<String, serde_json::Error> {
    let code = add_call(definition, &attach_dependencies(storage, definition));
    if source.is_corelibs() {
        Ok(wrap_in_anonymous_function(&code))
    } else {
        pass_source_and_args(source, &code)
    }
}

/// Builds injectable code for a redirect resolved from `source`. Redirects are always
/// self-invoking.
pub fn assemble_redirect(
    storage: &ResourceStorage,
    definition: &ScriptletDefinition,
    source: &ScriptletSource,
) -> Result<String, serde_json::Error> {
    let code = add_call(definition, &attach_dependencies(storage, definition));
    pass_source_and_args(source, &code)
}

/// The definition's body followed by the body of each helper it needs, one per line.
fn attach_dependencies(storage: &ResourceStorage, definition: &ScriptletDefinition) -> String {
    storage
        .recursive_dependencies(definition)
        .into_iter()
        .fold(definition.body().to_string(), |mut code, helper| {
            code.push('\n');
            code += helper.body();
            code
        })
}

fn add_call(definition: &ScriptletDefinition, code: &str) -> String {
    format!(
        "{code}\n\
         const updatedArgs = args ? [].concat(source).concat(args) : [source];\n\
         try {{\n\
         {name}.apply(this, updatedArgs);\n\
         }} catch (e) {{\n\
         console.log(e);\n\
         }}",
        code = code,
        name = definition.function_name(),
    )
}

fn wrap_in_anonymous_function(code: &str) -> String {
    format!("function(source, args){{\n{}\n}}", code)
}

fn pass_source_and_args(source: &ScriptletSource, code: &str) -> Result<String, serde_json::Error> {
    let mut params = serde_json::to_string(source)?;
    if !source.args.is_empty() {
        params += ", ";
        params += &serde_json::to_string(&source.args)?;
    }
    Ok(format!("(function(source, args){{\n{}\n}})({});", code, params))
}

#[cfg(test)]
#[path = "../../tests/unit/resources/injection.rs"]
mod unit_tests;
