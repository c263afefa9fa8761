//! The source-side abstract syntax tree.
//!
//! One closed union per syntactic role; every node carries a `Span`. Spans
//! are the node identities the analyzer keys its maps with, so the parser
//! must produce distinct spans for distinct nodes.

use crate::intern::Symbol;
use crate::syntax::span::{Span, Tracking};
use serde::{Deserialize, Serialize};

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub enum Literal {
    Number(f64),
    // raw, cooked
    String(Symbol, Symbol),
    Null,
    True,
    False,
    // pattern, flags
    Regex(Symbol, Symbol),
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub enum BinOp {
    Plus,
    Minus,
    Times,
    Div,
    Mod,
    BitXor,
    BitAnd,
    BitOr,
    LShift,
    RShift,
    URShift,
    EqEq,
    EqEqEq,
    NotEq,
    NotEqEq,
    Lt,
    Lte,
    Gt,
    Gte,
    In,
    Instanceof,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub enum LogOp {
    AndAnd,
    OrOr,
    Nullish,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub enum UnOp {
    Not,
    Minus,
    Plus,
    Tilde,
    Void,
    Delete,
    Typeof,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub enum UpdateOp {
    PlusPlus,
    MinusMinus,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub enum AssignOp {
    Eq,
    PlusEq,
    MinusEq,
    TimesEq,
    DivEq,
    ModEq,
    LShiftEq,
    RShiftEq,
    URShiftEq,
    BitAndEq,
    BitXorEq,
    BitOrEq,
}

/// Infix classification used by the parser's precedence loop.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum InfixOp {
    BinOp(BinOp),
    LogOp(LogOp),
}

impl InfixOp {
    pub fn precedence(&self) -> u8 {
        match *self {
            InfixOp::LogOp(LogOp::Nullish) => 1,
            InfixOp::LogOp(LogOp::OrOr) => 1,
            InfixOp::LogOp(LogOp::AndAnd) => 2,
            InfixOp::BinOp(op) => match op {
                BinOp::BitOr => 3,
                BinOp::BitXor => 4,
                BinOp::BitAnd => 5,
                BinOp::EqEq | BinOp::EqEqEq | BinOp::NotEq | BinOp::NotEqEq => 6,
                BinOp::Lt | BinOp::Lte | BinOp::Gt | BinOp::Gte | BinOp::In | BinOp::Instanceof => 7,
                BinOp::LShift | BinOp::RShift | BinOp::URShift => 8,
                BinOp::Plus | BinOp::Minus => 9,
                BinOp::Times | BinOp::Div | BinOp::Mod => 11,
            },
        }
    }
}

#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub struct Id(pub Span, pub Symbol);

impl Id {
    pub fn name(&self) -> Symbol {
        self.1
    }
}

impl Tracking for Id {
    fn span(&self) -> &Span {
        &self.0
    }
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub enum PropKey {
    Identifier(Id),
    String(Span, Symbol),
    Number(Span, f64),
    Computed(Span, Box<Expression>),
}

impl PropKey {
    /// The literal key name, when the key is not computed.
    pub fn static_name(&self) -> Option<Symbol> {
        match *self {
            PropKey::Identifier(ref id) => Some(id.1),
            PropKey::String(_, cooked) => Some(cooked),
            PropKey::Number(_, n) => Some(crate::intern::intern(&crate::syntax::number_to_key(n))),
            PropKey::Computed(..) => None,
        }
    }

    pub fn span(&self) -> Span {
        match *self {
            PropKey::Identifier(ref id) => id.0,
            PropKey::String(sp, _) | PropKey::Number(sp, _) | PropKey::Computed(sp, _) => sp,
        }
    }
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub enum Prop {
    Init {
        span: Span,
        key: PropKey,
        value: Expression,
        shorthand: bool,
    },
    Method(Span, PropKey, Function),
    Get(Span, PropKey, Function),
    Set(Span, PropKey, Function),
    Spread(Span, Expression),
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct PropPattern {
    pub span: Span,
    pub key: PropKey,
    pub value: Pattern,
    pub shorthand: bool,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub enum Pattern {
    Identifier(Id),
    Assignment {
        span: Span,
        target: Box<Pattern>,
        default: Box<Expression>,
    },
    Array {
        span: Span,
        elements: Vec<Option<Pattern>>,
    },
    Object {
        span: Span,
        properties: Vec<PropPattern>,
        rest: Option<Id>,
    },
    Rest(Span, Box<Pattern>),
}

impl Pattern {
    pub fn span(&self) -> Span {
        match *self {
            Pattern::Identifier(ref id) => id.0,
            Pattern::Assignment { span, .. }
            | Pattern::Array { span, .. }
            | Pattern::Object { span, .. }
            | Pattern::Rest(span, _) => span,
        }
    }

    /// Anything beyond a bare identifier or a flat identifier list.
    pub fn is_complex(&self) -> bool {
        match *self {
            Pattern::Identifier(_) => false,
            Pattern::Assignment { .. } | Pattern::Rest(..) => true,
            Pattern::Array { ref elements, .. } => elements
                .iter()
                .any(|e| e.as_ref().map_or(true, |p| !matches!(p, Pattern::Identifier(_)))),
            Pattern::Object {
                ref properties,
                ref rest,
                ..
            } => {
                rest.is_some()
                    || properties
                        .iter()
                        .any(|p| !matches!(p.value, Pattern::Identifier(_)))
            }
        }
    }
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Function {
    pub span: Span,
    pub id: Option<Id>,
    pub parameters: Vec<Pattern>,
    pub body: Block,
    pub generator: bool,
    pub is_async: bool,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub enum ArrowBody {
    Expression(Box<Expression>),
    Block(Block),
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct ArrowFunction {
    pub span: Span,
    pub parameters: Vec<Pattern>,
    pub body: ArrowBody,
    pub is_async: bool,
}

impl ArrowFunction {
    pub fn is_expression(&self) -> bool {
        matches!(self.body, ArrowBody::Expression(_))
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub enum MethodKind {
    Constructor,
    Method,
    Get,
    Set,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct MethodDefinition {
    pub span: Span,
    pub key: PropKey,
    pub value: Function,
    pub kind: MethodKind,
    pub is_static: bool,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct ClassDecl {
    pub id: Option<Id>,
    pub super_class: Option<Box<Expression>>,
    pub body: Vec<MethodDefinition>,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct TemplateElement {
    pub span: Span,
    pub raw: Symbol,
    pub cooked: Symbol,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Template {
    pub quasis: Vec<TemplateElement>,
    pub expressions: Vec<Expression>,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub enum ArrayElement {
    Hole(Span),
    Expression(Expression),
    Spread(Span, Expression),
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub enum Argument {
    Expression(Expression),
    Spread(Span, Expression),
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub enum AssignTarget {
    Identifier(Id),
    StaticMember(Span, Box<Expression>, Symbol),
    ComputedMember(Span, Box<Expression>, Box<Expression>),
}

impl AssignTarget {
    pub fn span(&self) -> Span {
        match *self {
            AssignTarget::Identifier(ref id) => id.0,
            AssignTarget::StaticMember(sp, ..) | AssignTarget::ComputedMember(sp, ..) => sp,
        }
    }
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub enum Expression {
    Literal(Span, Literal),
    Identifier(Id),
    This(Span),
    Array(Span, Vec<ArrayElement>),
    Object(Span, Vec<Prop>),
    Function(Function),
    ArrowFunction(ArrowFunction),
    Class(Span, ClassDecl),
    TemplateLiteral(Span, Template),
    Unary(Span, UnOp, Box<Expression>),
    // prefix flag last
    Update(Span, UpdateOp, Box<AssignTarget>, bool),
    Binary(Span, BinOp, Box<Expression>, Box<Expression>),
    Logical(Span, LogOp, Box<Expression>, Box<Expression>),
    Conditional(Span, Box<Expression>, Box<Expression>, Box<Expression>),
    Assignment(Span, AssignOp, Box<AssignTarget>, Box<Expression>),
    Sequence(Span, Vec<Expression>),
    Call(Span, Box<Expression>, Vec<Argument>),
    New(Span, Box<Expression>, Vec<Argument>),
    StaticMember(Span, Box<Expression>, Symbol),
    ComputedMember(Span, Box<Expression>, Box<Expression>),
}

impl Expression {
    pub fn span(&self) -> Span {
        match *self {
            Expression::Literal(sp, _)
            | Expression::This(sp)
            | Expression::Array(sp, _)
            | Expression::Object(sp, _)
            | Expression::Class(sp, _)
            | Expression::TemplateLiteral(sp, _)
            | Expression::Unary(sp, ..)
            | Expression::Update(sp, ..)
            | Expression::Binary(sp, ..)
            | Expression::Logical(sp, ..)
            | Expression::Conditional(sp, ..)
            | Expression::Assignment(sp, ..)
            | Expression::Sequence(sp, _)
            | Expression::Call(sp, ..)
            | Expression::New(sp, ..)
            | Expression::StaticMember(sp, ..)
            | Expression::ComputedMember(sp, ..) => sp,
            Expression::Identifier(ref id) => id.0,
            Expression::Function(ref f) => f.span,
            Expression::ArrowFunction(ref f) => f.span,
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub enum VariableDeclarationKind {
    Var,
    Let,
    Const,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct VariableDeclarator {
    pub span: Span,
    pub id: Pattern,
    pub init: Option<Expression>,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct VariableDeclaration {
    pub span: Span,
    pub kind: VariableDeclarationKind,
    pub declarations: Vec<VariableDeclarator>,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub enum ForInit {
    VarDecl(VariableDeclaration),
    Expression(Expression),
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct ForStatement {
    pub init: Option<ForInit>,
    pub test: Option<Expression>,
    pub update: Option<Expression>,
    pub body: Statement,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub enum ForTarget {
    VarDecl(VariableDeclaration),
    Target(AssignTarget),
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct ForEachStatement {
    pub left: ForTarget,
    pub right: Expression,
    pub body: Statement,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct CatchClause {
    pub span: Span,
    pub param: Option<Pattern>,
    pub body: Block,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct SwitchCase {
    pub span: Span,
    pub test: Option<Expression>,
    pub consequent: Vec<Statement>,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Block(pub Span, pub Vec<Statement>);

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct ImportDeclaration {
    pub span: Span,
    pub specifiers: Vec<ImportSpecifier>,
    pub source: (Span, Symbol),
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub enum ImportSpecifier {
    Default(Id),
    Named { span: Span, imported: Id, local: Id },
    Namespace(Span, Id),
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct ExportSpecifier {
    pub span: Span,
    pub local: Id,
    pub exported: Id,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub enum ExportDeclaration {
    Default(Span, Box<Expression>),
    Named {
        span: Span,
        specifiers: Vec<ExportSpecifier>,
        source: Option<(Span, Symbol)>,
    },
    Decl(Span, Box<Statement>),
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub enum Statement {
    Expression(Span, Expression),
    // expression statement that is a directive prologue entry
    Directive(Span, Expression, Symbol),
    Block(Block),
    Empty(Span),
    Debugger(Span),
    VariableDeclaration(VariableDeclaration),
    FunctionDeclaration(Function),
    ClassDeclaration(Span, ClassDecl),
    If(Span, Expression, Box<Statement>, Option<Box<Statement>>),
    For(Span, Box<ForStatement>),
    ForIn(Span, Box<ForEachStatement>),
    ForOf(Span, Box<ForEachStatement>),
    While(Span, Expression, Box<Statement>),
    DoWhile(Span, Box<Statement>, Expression),
    Switch(Span, Expression, Vec<SwitchCase>),
    Try(Span, Block, Option<CatchClause>, Option<Block>),
    Throw(Span, Expression),
    Return(Span, Option<Expression>),
    Break(Span, Option<Id>),
    Continue(Span, Option<Id>),
    Labeled(Span, Id, Box<Statement>),
    With(Span, Expression, Box<Statement>),
    Import(ImportDeclaration),
    Export(ExportDeclaration),
}

impl Statement {
    pub fn span(&self) -> Span {
        match *self {
            Statement::Expression(sp, _)
            | Statement::Directive(sp, ..)
            | Statement::Empty(sp)
            | Statement::Debugger(sp)
            | Statement::ClassDeclaration(sp, _)
            | Statement::If(sp, ..)
            | Statement::For(sp, _)
            | Statement::ForIn(sp, _)
            | Statement::ForOf(sp, _)
            | Statement::While(sp, ..)
            | Statement::DoWhile(sp, ..)
            | Statement::Switch(sp, ..)
            | Statement::Try(sp, ..)
            | Statement::Throw(sp, _)
            | Statement::Return(sp, _)
            | Statement::Break(sp, _)
            | Statement::Continue(sp, _)
            | Statement::Labeled(sp, ..)
            | Statement::With(sp, ..) => sp,
            Statement::Block(ref b) => b.0,
            Statement::VariableDeclaration(ref d) => d.span,
            Statement::FunctionDeclaration(ref f) => f.span,
            Statement::Import(ref i) => i.span,
            Statement::Export(ref e) => match *e {
                ExportDeclaration::Default(sp, _)
                | ExportDeclaration::Named { span: sp, .. }
                | ExportDeclaration::Decl(sp, _) => sp,
            },
        }
    }
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Program {
    pub span: Span,
    pub body: Vec<Statement>,
}
