use crate::{ast::*, flags::Flags, ident::*, keyword::Keyword, operators::Operator, parse::*, token_tree::*};
use jv_common::{span::*, TracedError};
use std::{fmt, rc::Rc};

#[derive(Eq, PartialEq, Copy, Clone, Debug, Hash)]
pub enum ClassDeclKind {
    Class,
    Interface,
}

impl fmt::Display for ClassDeclKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            ClassDeclKind::Class => "class",
            ClassDeclKind::Interface => "interface",
        })
    }
}

#[derive(Clone, Debug)]
pub struct ClassDecl<A: Annotation> {
    pub flags: Flags,
    pub kind: ClassDeclKind,
    pub name: Ident,
    pub superclass: Option<TypeNode<A>>,
    pub interfaces: Vec<TypeNode<A>>,
    pub members: Vec<Member<A>>,
    pub annotation: A,
}

#[derive(Clone, Debug)]
pub enum Member<A: Annotation> {
    Field(Rc<FieldDecl<A>>),
    Proc(Rc<ProcDecl<A>>),
    Initializer(Rc<Initializer<A>>),
    Class(Rc<ClassDecl<A>>),
}

node_category!(Member {
    Field,
    Proc,
    Initializer,
    Class
});

/// Declares a single field. Declarations of several fields in one statement are split
/// into one node per field.
#[derive(Clone, Debug)]
pub struct FieldDecl<A: Annotation> {
    pub flags: Flags,
    pub ty: TypeNode<A>,
    pub name: Ident,
    pub init: Option<Expr<A>>,
    pub annotation: A,
}

#[derive(Eq, PartialEq, Copy, Clone, Debug, Hash)]
pub enum ProcKind {
    Method,
    Constructor,
}

impl fmt::Display for ProcKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            ProcKind::Method => "method",
            ProcKind::Constructor => "constructor",
        })
    }
}

/// A method or constructor. Constructors have no return type.
#[derive(Clone, Debug)]
pub struct ProcDecl<A: Annotation> {
    pub kind: ProcKind,
    pub flags: Flags,
    pub ret: Option<TypeNode<A>>,
    pub name: Ident,
    pub formals: Vec<Rc<Formal<A>>>,
    pub throws: Vec<TypeNode<A>>,
    pub body: Option<Rc<Block<A>>>,
    pub annotation: A,
}

#[derive(Clone, Debug)]
pub struct Formal<A: Annotation> {
    pub flags: Flags,
    pub ty: TypeNode<A>,
    pub name: Ident,
    pub annotation: A,
}

#[derive(Clone, Debug)]
pub struct Initializer<A: Annotation> {
    pub is_static: bool,
    pub body: Rc<Block<A>>,
    pub annotation: A,
}

/// Parses any number of modifier keywords.
pub fn parse_flags(tokens: &mut TokenStream) -> ParseResult<Flags> {
    let mut flags = Flags::NONE;
    while let Some(TokenTree::Keyword { kw, span }) = tokens.current().cloned() {
        let flag = match Flags::from_keyword(kw) {
            Some(flag) => flag,
            None => break,
        };
        if flags.contains(flag) {
            return Err(TracedError::trace(ParseError::RepeatedModifier(kw, span)));
        }
        flags |= flag;
        tokens.advance(1);
    }
    Ok(flags)
}

impl<A: Annotation> ClassDecl<A> {
    /// Parses a class or interface declaration following its modifiers.
    pub fn parse(tokens: &mut TokenStream, flags: Flags) -> ParseResult<Self> {
        let kw_token = tokens.match_one(Keyword::Class.or(Keyword::Interface))?;
        let kind = match kw_token.as_keyword() {
            Some(Keyword::Interface) => ClassDeclKind::Interface,
            _ => ClassDeclKind::Class,
        };

        let name = match tokens.match_one(Matcher::AnyIdent)?.as_ident() {
            Some(name) => name.clone(),
            None => unreachable!("matched an identifier"),
        };

        let mut superclass = None;
        let mut interfaces = Vec::new();

        match kind {
            ClassDeclKind::Class => {
                if tokens.match_one_maybe(Keyword::Extends).is_some() {
                    superclass = Some(TypeNode::parse(tokens)?);
                }
                if tokens.match_one_maybe(Keyword::Implements).is_some() {
                    interfaces = parse_type_list(tokens)?;
                }
            },

            // interfaces list their superinterfaces after `extends`
            ClassDeclKind::Interface => {
                if tokens.match_one_maybe(Keyword::Extends).is_some() {
                    interfaces = parse_type_list(tokens)?;
                }
            },
        }

        let body = tokens.match_one(DelimiterPair::Brace)?;
        let body = match body.as_delimited() {
            Some(body) => body.clone(),
            None => unreachable!("matched a brace group"),
        };

        let mut body_tokens = TokenStream::new(body.inner.clone(), body.open.clone());
        let mut members = Vec::new();
        while body_tokens.current().is_some() {
            Member::parse_into(&mut body_tokens, &name, &mut members)?;
        }

        let span = kw_token.span().to(&body.span);
        Ok(ClassDecl {
            flags,
            kind,
            name,
            superclass,
            interfaces,
            members,
            annotation: A::from(span),
        })
    }

    pub fn is_interface(&self) -> bool {
        self.kind == ClassDeclKind::Interface
    }
}

fn parse_type_list<A: Annotation>(tokens: &mut TokenStream) -> ParseResult<Vec<TypeNode<A>>> {
    let mut types = vec![TypeNode::parse(tokens)?];
    while tokens.match_one_maybe(Separator::Comma).is_some() {
        types.push(TypeNode::parse(tokens)?);
    }
    Ok(types)
}

impl<A: Annotation> Member<A> {
    /// Parses one member declaration of the class named `class_name`, appending it to
    /// `members`. Field declarations of several variables append one member per field.
    pub fn parse_into(tokens: &mut TokenStream, class_name: &Ident, members: &mut Vec<Self>) -> ParseResult<()> {
        if tokens.match_one_maybe(Separator::Semicolon).is_some() {
            return Ok(());
        }

        let flags = parse_flags(tokens)?;
        let start = tokens.context().clone();

        match tokens.current().cloned() {
            Some(TokenTree::Delimited(group)) if group.delim == DelimiterPair::Brace => {
                tokens.advance(1);
                let body = Block::parse_group(&group)?;
                members.push(Member::Initializer(Rc::new(Initializer {
                    is_static: flags.is_static(),
                    body,
                    annotation: A::from(group.span.clone()),
                })));
            },

            Some(TokenTree::Keyword { kw: Keyword::Class, .. })
            | Some(TokenTree::Keyword { kw: Keyword::Interface, .. }) => {
                let class = ClassDecl::parse(tokens, flags)?;
                members.push(Member::Class(Rc::new(class)));
            },

            Some(TokenTree::Ident(name))
                if name == *class_name
                    && tokens.peek_is(1, DelimiterPair::Bracket) =>
            {
                tokens.advance(1);
                let ctor = ProcDecl::parse_rest(tokens, ProcKind::Constructor, flags, None, name)?;
                members.push(Member::Proc(Rc::new(ctor)));
            },

            Some(TokenTree::Keyword { kw: Keyword::Void, span }) => {
                tokens.advance(1);
                let ret = TypeNode::primitive(PrimitiveKind::Void, span);
                let name = parse_name(tokens)?;
                let method = ProcDecl::parse_rest(tokens, ProcKind::Method, flags, Some(ret), name)?;
                members.push(Member::Proc(Rc::new(method)));
            },

            Some(_) => {
                let ty = TypeNode::parse(tokens)?;
                let name = parse_name(tokens)?;

                if tokens.peek_is(0, DelimiterPair::Bracket) {
                    let method = ProcDecl::parse_rest(tokens, ProcKind::Method, flags, Some(ty), name)?;
                    members.push(Member::Proc(Rc::new(method)));
                } else {
                    FieldDecl::parse_rest(tokens, flags, ty, name, members)?;
                }
            },

            None => {
                return Err(TracedError::trace(ParseError::UnexpectedEOF(
                    Matcher::AnyIdent,
                    start,
                )))
            },
        }

        Ok(())
    }
}

fn parse_name(tokens: &mut TokenStream) -> ParseResult<Ident> {
    match tokens.match_one(Matcher::AnyIdent)?.as_ident() {
        Some(name) => Ok(name.clone()),
        None => unreachable!("matched an identifier"),
    }
}

impl<A: Annotation> FieldDecl<A> {
    fn parse_rest(
        tokens: &mut TokenStream,
        flags: Flags,
        ty: TypeNode<A>,
        first_name: Ident,
        members: &mut Vec<Member<A>>,
    ) -> ParseResult<()> {
        let mut name = first_name;
        loop {
            let field_ty = TypeNode::parse_dims(ty.clone(), tokens);
            let init = match tokens.match_one_maybe(Operator::Assignment) {
                Some(_) => Some(Expr::parse(tokens)?),
                None => None,
            };

            let span = match &init {
                Some(init) => name.span.to(init),
                None => name.span.clone(),
            };

            members.push(Member::Field(Rc::new(FieldDecl {
                flags,
                ty: field_ty,
                name,
                init,
                annotation: A::from(span),
            })));

            if tokens.match_one_maybe(Separator::Comma).is_none() {
                break;
            }
            name = parse_name(tokens)?;
        }

        tokens.match_one(Separator::Semicolon)?;
        Ok(())
    }
}

impl<A: Annotation> ProcDecl<A> {
    /// Parses the formal parameter list, throws clause and body of a method or
    /// constructor whose name has already been read.
    fn parse_rest(
        tokens: &mut TokenStream,
        kind: ProcKind,
        flags: Flags,
        ret: Option<TypeNode<A>>,
        name: Ident,
    ) -> ParseResult<Self> {
        let formals_group = tokens.match_one(DelimiterPair::Bracket)?;
        let formals = match formals_group.as_delimited() {
            Some(group) => Formal::parse_list(group)?,
            None => unreachable!("matched a bracket group"),
        };

        // old-style array return types put the dimensions after the formals
        let ret = ret.map(|ret| TypeNode::parse_dims(ret, tokens));

        let throws = match tokens.match_one_maybe(Keyword::Throws) {
            Some(_) => parse_type_list(tokens)?,
            None => Vec::new(),
        };

        let (body, end) = match tokens.match_one_maybe(Separator::Semicolon) {
            Some(semicolon) => (None, semicolon.span().clone()),
            None => {
                let body = Block::<A>::parse(tokens)?;
                let end = body.annotation.span().clone();
                (Some(body), end)
            },
        };

        let start = match &ret {
            Some(ret) => ret.span().clone(),
            None => name.span.clone(),
        };

        Ok(ProcDecl {
            kind,
            flags,
            ret,
            name,
            formals,
            throws,
            body,
            annotation: A::from(start.to(&end)),
        })
    }

    pub fn is_constructor(&self) -> bool {
        self.kind == ProcKind::Constructor
    }
}

impl<A: Annotation> Formal<A> {
    fn parse_list(group: &DelimitedGroup) -> ParseResult<Vec<Rc<Self>>> {
        let mut tokens = TokenStream::new(group.inner.clone(), group.open.clone());
        let mut formals = Vec::new();
        if tokens.current().is_none() {
            return Ok(formals);
        }

        loop {
            let flags = match tokens.match_one_maybe(Keyword::Final) {
                Some(_) => Flags::FINAL,
                None => Flags::NONE,
            };
            let ty = TypeNode::parse(&mut tokens)?;
            let name = parse_name(&mut tokens)?;
            let ty = TypeNode::parse_dims(ty, &mut tokens);
            let span = ty.span().to(&name);

            formals.push(Rc::new(Formal {
                flags,
                ty,
                name,
                annotation: A::from(span),
            }));

            if tokens.match_one_maybe(Separator::Comma).is_none() {
                break;
            }
        }
        tokens.finish()?;

        Ok(formals)
    }
}

impl<A: Annotation> Spanned for ClassDecl<A> {
    fn span(&self) -> &Span {
        self.annotation.span()
    }
}

impl<A: Annotation> fmt::Display for Member<A> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Member::Field(field) => write!(f, "field {}", field.name),
            Member::Proc(proc_decl) => write!(f, "{} {}", proc_decl.kind, proc_decl.name),
            Member::Initializer(init) if init.is_static => write!(f, "static initializer"),
            Member::Initializer(_) => write!(f, "initializer"),
            Member::Class(class) => write!(f, "{} {}", class.kind, class.name),
        }
    }
}
