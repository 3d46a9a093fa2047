// Matching of parsed declarations against semantic-model signatures

use crate::ast::MethodDecl;
use crate::model::MethodSignature;

/// Textual type match: the semantic type ends with the type as written in source
///
/// Lets `java.lang.String` match a declaration written as `String`. This is a
/// suffix test, not name resolution, so it also accepts `com.foo.Integer`
/// against `Integer` and `MyString` against `String`.
pub fn signature_similar(semantic: &str, declared: &str) -> bool {
    semantic.ends_with(declared)
}

/// Return type equality up to package qualification
///
/// `java.util.List<String>` equals a declared `List<String>`, while
/// `com.foo.MyWidget` does not equal `Widget`. Types that share a simple name
/// across packages still compare equal.
pub fn return_type_equal(semantic: &str, declared: &str) -> bool {
    semantic == declared
        || semantic
            .strip_suffix(declared)
            .map(|qualifier| qualifier.ends_with('.'))
            .unwrap_or(false)
}

/// Whether `decl` is the source declaration of `method`
///
/// Name and arity must be equal, the return type must pass
/// [`return_type_equal`] and parameter types go through [`signature_similar`]
/// position by position.
pub fn declaration_matches(decl: &MethodDecl, method: &MethodSignature) -> bool {
    decl.name == method.simple_name
        && decl.parameters.len() == method.arity()
        && return_type_equal(&method.return_type, &decl.return_type_text())
        && decl
            .parameters
            .iter()
            .zip(&method.parameter_types)
            .all(|(param, semantic)| signature_similar(semantic, &param.type_text()))
}
