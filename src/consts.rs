// Defaults shared by the config layer, the resolver and the source-tree model

// Qualified name of the marker annotation
pub const DEFAULT_MARKER_ANNOTATION: &str = "callsuper.MustCallSuper";

// The ancestor walk stops here
pub const DEFAULT_ROOT_CLASS: &str = "java.lang.Object";

// Source root used when neither an argument nor the environment names one
pub const DEFAULT_SOURCE_ROOT: &str = "src/main/java";

pub const ENV_SOURCE_ROOT: &str = "CALLSUPER_SOURCE_ROOT";
pub const ENV_MARKER: &str = "CALLSUPER_MARKER";

pub const JAVA_SOURCE_EXTENSION: &str = "java";

// Upper bound on ancestor hops; a cyclic host model must not hang the run
pub const MAX_HIERARCHY_STEPS: usize = 10_000;

// Upper bound on indexed files for the source-tree model
pub const MAX_INDEXED_FILES: usize = 50_000;

// Well-known simple names from java.lang, resolved the way javac prints them
pub const JAVA_LANG_SIMPLE_TYPES: &[&str] = &[
    "String", "Object", "Throwable", "Cloneable", "Iterable", "Comparable",
    "CharSequence", "Runnable", "AutoCloseable", "Number", "Enum", "Math",
    "Integer", "Long", "Float", "Double", "Boolean", "Character",
    "Short", "Byte", "Void", "Class", "System", "Thread", "StringBuilder",
    "RuntimeException", "Exception", "Error", "AssertionError",
    "IllegalArgumentException", "IllegalStateException",
    "UnsupportedOperationException", "NullPointerException",
    "Override", "Deprecated", "SuppressWarnings", "FunctionalInterface",
    "SafeVarargs",
];

pub const PRIMITIVE_TYPES: &[&str] = &[
    "boolean", "byte", "short", "int", "long", "char", "float", "double", "void",
];
