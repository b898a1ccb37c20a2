use crate::{ast::*, ident::*, keyword::Keyword, operators::Operator, parse::*, token_tree::*};
use jv_common::span::*;
use std::{fmt, path::PathBuf, rc::Rc};

#[derive(Clone, Debug)]
pub struct Import {
    pub name: IdentPath,
    /// `import p.*;` imports every class of package `p`
    pub on_demand: bool,
    pub span: Span,
}

impl fmt::Display for Import {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.on_demand {
            write!(f, "import {}.*;", self.name)
        } else {
            write!(f, "import {};", self.name)
        }
    }
}

/// One source file: a package declaration, its imports and its top-level classes.
#[derive(Clone, Debug)]
pub struct Unit<A: Annotation> {
    pub file: Rc<PathBuf>,
    pub package: Option<IdentPath>,
    pub imports: Vec<Import>,
    pub classes: Vec<Rc<ClassDecl<A>>>,
    pub annotation: A,
}

impl<A: Annotation> Unit<A> {
    pub fn parse(tokens: &mut TokenStream, file: impl Into<PathBuf>) -> ParseResult<Self> {
        let file = Rc::new(file.into());

        let package = match tokens.match_one_maybe(Keyword::Package) {
            Some(_) => {
                let name = parse_ident_path(tokens)?;
                tokens.match_one(Separator::Semicolon)?;
                Some(name)
            },
            None => None,
        };

        let mut imports = Vec::new();
        while let Some(import_kw) = tokens.match_one_maybe(Keyword::Import) {
            imports.push(parse_import(tokens, import_kw.span())?);
        }

        let mut classes = Vec::new();
        while tokens.current().is_some() {
            if tokens.match_one_maybe(Separator::Semicolon).is_some() {
                continue;
            }

            let flags = parse_flags(tokens)?;
            classes.push(Rc::new(ClassDecl::parse(tokens, flags)?));
        }

        Ok(Unit {
            annotation: A::from(Span::zero(file.as_ref().clone())),
            file,
            package,
            imports,
            classes,
        })
    }
}

fn parse_import(tokens: &mut TokenStream, start: &Span) -> ParseResult<Import> {
    let first = tokens.match_one(Matcher::AnyIdent)?;
    let mut parts: Vec<Ident> = first.as_ident().cloned().into_iter().collect();
    let mut on_demand = false;

    loop {
        if tokens.match_one_maybe(Separator::Dot).is_none() {
            break;
        }

        match tokens.match_one(Matcher::AnyIdent.or(Operator::Multiply))? {
            TokenTree::Ident(part) => parts.push(part),
            _ => {
                on_demand = true;
                break;
            },
        }
    }

    let end = tokens.match_one(Separator::Semicolon)?;

    Ok(Import {
        name: IdentPath::from_parts(parts),
        on_demand,
        span: start.to(&end),
    })
}
