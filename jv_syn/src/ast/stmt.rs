use crate::{ast::*, flags::Flags, ident::*, keyword::Keyword, operators::Operator, parse::*, token_tree::*};
use jv_common::{span::*, TracedError};
use std::{fmt, rc::Rc};

#[derive(Clone, Debug)]
pub enum Stmt<A: Annotation> {
    Block(Rc<Block<A>>),
    LocalDecl(Rc<LocalDecl<A>>),
    Expr(Rc<ExprStmt<A>>),
    If(Rc<If<A>>),
    While(Rc<While<A>>),
    Do(Rc<Do<A>>),
    For(Rc<For<A>>),
    Return(Rc<Return<A>>),
    Break(Rc<Jump<A>>),
    Continue(Rc<Jump<A>>),
    Labeled(Rc<Labeled<A>>),
    Throw(Rc<Throw<A>>),
    CtorCall(Rc<CtorCall<A>>),
    Empty(Rc<Empty<A>>),
}

node_category!(Stmt {
    Block,
    LocalDecl,
    Expr,
    If,
    While,
    Do,
    For,
    Return,
    Break,
    Continue,
    Labeled,
    Throw,
    CtorCall,
    Empty,
});

#[derive(Clone, Debug)]
pub struct Block<A: Annotation> {
    pub stmts: Vec<Stmt<A>>,
    pub annotation: A,
}

/// Declares a single local variable. Declarations of several variables in one statement
/// are split into one node per variable.
#[derive(Clone, Debug)]
pub struct LocalDecl<A: Annotation> {
    pub flags: Flags,
    pub ty: TypeNode<A>,
    pub name: Ident,
    pub init: Option<Expr<A>>,
    pub annotation: A,
}

#[derive(Clone, Debug)]
pub struct ExprStmt<A: Annotation> {
    pub expr: Expr<A>,
    pub annotation: A,
}

#[derive(Clone, Debug)]
pub struct If<A: Annotation> {
    pub cond: Expr<A>,
    pub then_branch: Stmt<A>,
    pub else_branch: Option<Stmt<A>>,
    pub annotation: A,
}

#[derive(Clone, Debug)]
pub struct While<A: Annotation> {
    pub cond: Expr<A>,
    pub body: Stmt<A>,
    pub annotation: A,
}

#[derive(Clone, Debug)]
pub struct Do<A: Annotation> {
    pub body: Stmt<A>,
    pub cond: Expr<A>,
    pub annotation: A,
}

#[derive(Clone, Debug)]
pub struct For<A: Annotation> {
    pub init: Vec<Stmt<A>>,
    pub cond: Option<Expr<A>>,
    pub update: Vec<Expr<A>>,
    pub body: Stmt<A>,
    pub annotation: A,
}

#[derive(Clone, Debug)]
pub struct Return<A: Annotation> {
    pub value: Option<Expr<A>>,
    pub annotation: A,
}

/// `break` or `continue`, with an optional target label.
#[derive(Clone, Debug)]
pub struct Jump<A: Annotation> {
    pub label: Option<Ident>,
    pub annotation: A,
}

#[derive(Clone, Debug)]
pub struct Labeled<A: Annotation> {
    pub label: Ident,
    pub stmt: Stmt<A>,
    pub annotation: A,
}

#[derive(Clone, Debug)]
pub struct Throw<A: Annotation> {
    pub expr: Expr<A>,
    pub annotation: A,
}

/// An explicit `this(...)` or `super(...)` constructor invocation.
#[derive(Clone, Debug)]
pub struct CtorCall<A: Annotation> {
    pub kind: SpecialKind,
    pub args: Vec<Expr<A>>,
    pub annotation: A,
}

#[derive(Clone, Debug)]
pub struct Empty<A: Annotation> {
    pub annotation: A,
}

impl<A: Annotation> Stmt<A> {
    pub fn is_loop(&self) -> bool {
        matches!(self, Stmt::While(..) | Stmt::Do(..) | Stmt::For(..))
    }

    /// Parses one statement. A local variable declaration in this position may only
    /// declare a single variable.
    pub fn parse(tokens: &mut TokenStream) -> ParseResult<Self> {
        let mut stmts = Vec::new();
        Self::parse_into(tokens, &mut stmts)?;

        match stmts.len() {
            1 => Ok(stmts.remove(0)),
            _ => {
                let span = stmts[0].span().to(stmts[stmts.len() - 1].span());
                Ok(Stmt::Block(Rc::new(Block {
                    stmts,
                    annotation: A::from(span),
                })))
            },
        }
    }

    /// Parses one statement, appending it to `stmts`. Declarations of several variables
    /// append one statement per variable.
    pub fn parse_into(tokens: &mut TokenStream, stmts: &mut Vec<Self>) -> ParseResult<()> {
        let token = match tokens.current() {
            Some(token) => token.clone(),
            None => {
                return Err(TracedError::trace(ParseError::UnexpectedEOF(
                    Matcher::StmtStart,
                    tokens.context().clone(),
                )))
            },
        };

        let stmt = match token {
            TokenTree::Delimited(group) if group.delim == DelimiterPair::Brace => {
                tokens.advance(1);
                Stmt::Block(Block::parse_group(&group)?)
            },

            TokenTree::Separator { sep: Separator::Semicolon, span } => {
                tokens.advance(1);
                Stmt::Empty(Rc::new(Empty { annotation: A::from(span) }))
            },

            TokenTree::Keyword { kw, span } => match kw {
                Keyword::If => parse_if(tokens, span)?,
                Keyword::While => parse_while(tokens, span)?,
                Keyword::Do => parse_do(tokens, span)?,
                Keyword::For => parse_for(tokens, span)?,
                Keyword::Return => parse_return(tokens, span)?,
                Keyword::Break | Keyword::Continue => parse_jump(tokens, kw, span)?,
                Keyword::Throw => {
                    tokens.advance(1);
                    let expr = Expr::parse(tokens)?;
                    let end = tokens.match_one(Separator::Semicolon)?;
                    Stmt::Throw(Rc::new(Throw {
                        expr,
                        annotation: A::from(span.to(&end)),
                    }))
                },

                Keyword::This | Keyword::Super if is_ctor_call(tokens) => {
                    tokens.advance(1);
                    let group = tokens.match_one(DelimiterPair::Bracket)?;
                    let args = match group.as_delimited() {
                        Some(group) => Expr::parse_args(group)?,
                        None => unreachable!("matched a bracket group"),
                    };
                    let end = tokens.match_one(Separator::Semicolon)?;
                    let kind = if kw == Keyword::This {
                        SpecialKind::This
                    } else {
                        SpecialKind::Super
                    };
                    Stmt::CtorCall(Rc::new(CtorCall {
                        kind,
                        args,
                        annotation: A::from(span.to(&end)),
                    }))
                },

                _ if is_local_decl_start(tokens) => {
                    LocalDecl::parse_decls(tokens, stmts)?;
                    tokens.match_one(Separator::Semicolon)?;
                    return Ok(());
                },

                _ => parse_expr_stmt(tokens)?,
            },

            TokenTree::Ident(label)
                if tokens.peek_is(1, Separator::Colon) =>
            {
                tokens.advance(2);
                let stmt = Stmt::parse(tokens)?;
                let span = label.span.to(&stmt);
                Stmt::Labeled(Rc::new(Labeled {
                    label,
                    stmt,
                    annotation: A::from(span),
                }))
            },

            _ if is_local_decl_start(tokens) => {
                LocalDecl::parse_decls(tokens, stmts)?;
                tokens.match_one(Separator::Semicolon)?;
                return Ok(());
            },

            _ => parse_expr_stmt(tokens)?,
        };

        stmts.push(stmt);
        Ok(())
    }
}

impl<A: Annotation> Block<A> {
    pub fn parse_group(group: &DelimitedGroup) -> ParseResult<Rc<Self>> {
        let mut tokens = TokenStream::new(group.inner.clone(), group.open.clone());
        let mut stmts = Vec::new();
        while tokens.current().is_some() {
            Stmt::parse_into(&mut tokens, &mut stmts)?;
        }

        Ok(Rc::new(Block {
            stmts,
            annotation: A::from(group.span.clone()),
        }))
    }

    pub fn parse(tokens: &mut TokenStream) -> ParseResult<Rc<Self>> {
        let group = tokens.match_one(DelimiterPair::Brace)?;
        match group.as_delimited() {
            Some(group) => Self::parse_group(group),
            None => unreachable!("matched a brace group"),
        }
    }
}

impl<A: Annotation> LocalDecl<A> {
    /// Parses `[final] Type a [= init], b [= init]...` without the terminating semicolon.
    pub fn parse_decls(tokens: &mut TokenStream, stmts: &mut Vec<Stmt<A>>) -> ParseResult<()> {
        let flags = match tokens.match_one_maybe(Keyword::Final) {
            Some(_) => Flags::FINAL,
            None => Flags::NONE,
        };
        let ty = TypeNode::parse(tokens)?;

        loop {
            let name_token = tokens.match_one(Matcher::AnyIdent)?;
            let name = match name_token.as_ident() {
                Some(name) => name.clone(),
                None => unreachable!("matched an identifier"),
            };
            let ty = TypeNode::parse_dims(ty.clone(), tokens);

            let init = match tokens.match_one_maybe(Operator::Assignment) {
                Some(_) => Some(Expr::parse(tokens)?),
                None => None,
            };

            let span = match &init {
                Some(init) => ty.span().to(init),
                None => ty.span().to(&name),
            };

            stmts.push(Stmt::LocalDecl(Rc::new(LocalDecl {
                flags,
                ty,
                name,
                init,
                annotation: A::from(span),
            })));

            if tokens.match_one_maybe(Separator::Comma).is_none() {
                break Ok(());
            }
        }
    }
}

fn is_ctor_call(tokens: &TokenStream) -> bool {
    tokens.peek_is(1, DelimiterPair::Bracket)
}

/// A declaration starts with a type followed by an identifier, and the type is either a
/// primitive or a dotted name with optional `[]` dimensions.
pub fn is_local_decl_start(tokens: &TokenStream) -> bool {
    if tokens.peek_is(0, Keyword::Final) {
        return true;
    }

    match tokens.peek_type_len() {
        Some(len) => tokens.peek_is(len, Matcher::AnyIdent),
        None => false,
    }
}

fn parse_cond_group<A: Annotation>(tokens: &mut TokenStream) -> ParseResult<Expr<A>> {
    let group = tokens.match_one(DelimiterPair::Bracket)?;
    let group = match group.as_delimited() {
        Some(group) => group,
        None => unreachable!("matched a bracket group"),
    };

    let mut inner = TokenStream::new(group.inner.clone(), group.open.clone());
    let cond = Expr::parse(&mut inner)?;
    inner.finish()?;
    Ok(cond)
}

fn parse_if<A: Annotation>(tokens: &mut TokenStream, span: Span) -> ParseResult<Stmt<A>> {
    tokens.advance(1);
    let cond = parse_cond_group(tokens)?;
    let then_branch = Stmt::parse(tokens)?;

    let else_branch = match tokens.match_one_maybe(Keyword::Else) {
        Some(_) => Some(Stmt::parse(tokens)?),
        None => None,
    };

    let end = match &else_branch {
        Some(else_branch) => else_branch.span().clone(),
        None => then_branch.span().clone(),
    };

    Ok(Stmt::If(Rc::new(If {
        cond,
        then_branch,
        else_branch,
        annotation: A::from(span.to(&end)),
    })))
}

fn parse_while<A: Annotation>(tokens: &mut TokenStream, span: Span) -> ParseResult<Stmt<A>> {
    tokens.advance(1);
    let cond = parse_cond_group(tokens)?;
    let body = Stmt::parse(tokens)?;
    let span = span.to(&body);

    Ok(Stmt::While(Rc::new(While {
        cond,
        body,
        annotation: A::from(span),
    })))
}

fn parse_do<A: Annotation>(tokens: &mut TokenStream, span: Span) -> ParseResult<Stmt<A>> {
    tokens.advance(1);
    let body = Stmt::parse(tokens)?;
    tokens.match_one(Keyword::While)?;
    let cond = parse_cond_group(tokens)?;
    let end = tokens.match_one(Separator::Semicolon)?;

    Ok(Stmt::Do(Rc::new(Do {
        body,
        cond,
        annotation: A::from(span.to(&end)),
    })))
}

fn parse_for<A: Annotation>(tokens: &mut TokenStream, span: Span) -> ParseResult<Stmt<A>> {
    tokens.advance(1);
    let group = tokens.match_one(DelimiterPair::Bracket)?;
    let group = match group.as_delimited() {
        Some(group) => group.clone(),
        None => unreachable!("matched a bracket group"),
    };

    let mut header = TokenStream::new(group.inner.clone(), group.open.clone());

    let mut init = Vec::new();
    if header.match_one_maybe(Separator::Semicolon).is_none() {
        if is_local_decl_start(&header) {
            LocalDecl::parse_decls(&mut header, &mut init)?;
        } else {
            loop {
                init.push(expr_stmt(Expr::parse(&mut header)?)?);
                if header.match_one_maybe(Separator::Comma).is_none() {
                    break;
                }
            }
        }
        header.match_one(Separator::Semicolon)?;
    }

    let cond = match header.match_one_maybe(Separator::Semicolon) {
        Some(_) => None,
        None => {
            let cond = Expr::parse(&mut header)?;
            header.match_one(Separator::Semicolon)?;
            Some(cond)
        },
    };

    let mut update = Vec::new();
    while header.current().is_some() {
        let expr = Expr::parse(&mut header)?;
        if !expr.is_statement_expr() {
            return Err(TracedError::trace(ParseError::InvalidStatement {
                expr: expr.to_string(),
                span: expr.span().clone(),
            }));
        }
        update.push(expr);
        if header.match_one_maybe(Separator::Comma).is_none() {
            break;
        }
    }
    header.finish()?;

    let body = Stmt::parse(tokens)?;
    let span = span.to(&body);

    Ok(Stmt::For(Rc::new(For {
        init,
        cond,
        update,
        body,
        annotation: A::from(span),
    })))
}

fn parse_return<A: Annotation>(tokens: &mut TokenStream, span: Span) -> ParseResult<Stmt<A>> {
    tokens.advance(1);
    let value = match tokens.current() {
        Some(token) if token.is_separator(Separator::Semicolon) => None,
        _ => Some(Expr::parse(tokens)?),
    };
    let end = tokens.match_one(Separator::Semicolon)?;

    Ok(Stmt::Return(Rc::new(Return {
        value,
        annotation: A::from(span.to(&end)),
    })))
}

fn parse_jump<A: Annotation>(tokens: &mut TokenStream, kw: Keyword, span: Span) -> ParseResult<Stmt<A>> {
    tokens.advance(1);
    let label = tokens
        .match_one_maybe(Matcher::AnyIdent)
        .and_then(|token| token.as_ident().cloned());
    let end = tokens.match_one(Separator::Semicolon)?;

    let jump = Rc::new(Jump {
        label,
        annotation: A::from(span.to(&end)),
    });

    Ok(match kw {
        Keyword::Break => Stmt::Break(jump),
        _ => Stmt::Continue(jump),
    })
}

fn expr_stmt<A: Annotation>(expr: Expr<A>) -> ParseResult<Stmt<A>> {
    if !expr.is_statement_expr() {
        return Err(TracedError::trace(ParseError::InvalidStatement {
            expr: expr.to_string(),
            span: expr.span().clone(),
        }));
    }

    let annotation = expr.annotation().clone();
    Ok(Stmt::Expr(Rc::new(ExprStmt { expr, annotation })))
}

fn parse_expr_stmt<A: Annotation>(tokens: &mut TokenStream) -> ParseResult<Stmt<A>> {
    let expr = Expr::parse(tokens)?;
    tokens.match_one(Separator::Semicolon)?;
    expr_stmt(expr)
}

impl<A: Annotation> fmt::Display for Stmt<A> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Stmt::Block(block) => write!(f, "{{ {} statements }}", block.stmts.len()),
            Stmt::LocalDecl(decl) => match &decl.init {
                Some(init) => write!(f, "{} {} = {};", decl.ty, decl.name, init),
                None => write!(f, "{} {};", decl.ty, decl.name),
            },
            Stmt::Expr(expr) => write!(f, "{};", expr.expr),
            Stmt::If(if_stmt) => write!(f, "if ({}) ...", if_stmt.cond),
            Stmt::While(while_stmt) => write!(f, "while ({}) ...", while_stmt.cond),
            Stmt::Do(do_stmt) => write!(f, "do ... while ({});", do_stmt.cond),
            Stmt::For(_) => write!(f, "for (...) ..."),
            Stmt::Return(ret) => match &ret.value {
                Some(value) => write!(f, "return {};", value),
                None => write!(f, "return;"),
            },
            Stmt::Break(jump) | Stmt::Continue(jump) => {
                let kw = if matches!(self, Stmt::Break(..)) { "break" } else { "continue" };
                match &jump.label {
                    Some(label) => write!(f, "{} {};", kw, label),
                    None => write!(f, "{};", kw),
                }
            },
            Stmt::Labeled(labeled) => write!(f, "{}: {}", labeled.label, labeled.stmt),
            Stmt::Throw(throw) => write!(f, "throw {};", throw.expr),
            Stmt::CtorCall(call) => {
                write!(f, "{}(", call.kind)?;
                write_list(f, &call.args)?;
                write!(f, ");")
            },
            Stmt::Empty(_) => write!(f, ";"),
        }
    }
}
