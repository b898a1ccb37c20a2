use std::fmt;

macro_rules! keywords {
    ($($variant:ident => $text:literal,)*) => {
        #[derive(Eq, PartialEq, Clone, Copy, Debug, Hash)]
        pub enum Keyword {
            $($variant,)*
        }

        impl Keyword {
            pub fn try_parse(from: &str) -> Option<Keyword> {
                match from {
                    $($text => Some(Keyword::$variant),)*
                    _ => None,
                }
            }

            pub fn as_str(self) -> &'static str {
                match self {
                    $(Keyword::$variant => $text,)*
                }
            }
        }
    };
}

keywords! {
    Abstract => "abstract",
    Boolean => "boolean",
    Break => "break",
    Byte => "byte",
    Char => "char",
    Class => "class",
    Continue => "continue",
    Do => "do",
    Double => "double",
    Else => "else",
    Extends => "extends",
    False => "false",
    Final => "final",
    Float => "float",
    For => "for",
    If => "if",
    Implements => "implements",
    Import => "import",
    InstanceOf => "instanceof",
    Int => "int",
    Interface => "interface",
    Long => "long",
    Native => "native",
    New => "new",
    Null => "null",
    Package => "package",
    Private => "private",
    Protected => "protected",
    Public => "public",
    Return => "return",
    Short => "short",
    Static => "static",
    StrictFp => "strictfp",
    Super => "super",
    Synchronized => "synchronized",
    This => "this",
    Throw => "throw",
    Throws => "throws",
    Transient => "transient",
    True => "true",
    Void => "void",
    Volatile => "volatile",
    While => "while",
}

impl Keyword {
    pub fn is_primitive_type(self) -> bool {
        matches!(
            self,
            Keyword::Boolean
                | Keyword::Byte
                | Keyword::Char
                | Keyword::Short
                | Keyword::Int
                | Keyword::Long
                | Keyword::Float
                | Keyword::Double
        )
    }

    pub fn is_modifier(self) -> bool {
        matches!(
            self,
            Keyword::Public
                | Keyword::Protected
                | Keyword::Private
                | Keyword::Static
                | Keyword::Final
                | Keyword::Abstract
                | Keyword::Native
                | Keyword::Synchronized
                | Keyword::Transient
                | Keyword::Volatile
                | Keyword::StrictFp
        )
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
