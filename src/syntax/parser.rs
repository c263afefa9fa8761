use crate::diagnostics::{codes, Diagnostic, Level};
use crate::errors::{ErrorCause, Result, SyntaxError};
use crate::intern::{self, Symbol};
use crate::syntax::ast::*;
use crate::syntax::ops::AsOperator;
use crate::syntax::scanner::Scanner;
use crate::syntax::span::{Position, Span};
use crate::syntax::token::Token;
use crate::syntax::Mode;

pub struct Parser<'a> {
    scanner: Scanner<'a>,
    mode: Mode,
    tolerant: bool,
    allow_in: bool,
    file: String,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str, file: &str, mode: Mode, tolerant: bool) -> Result<Parser<'a>> {
        let mut scanner = Scanner::new(source);
        scanner.position_at_start()?;
        Ok(Parser {
            scanner,
            mode,
            tolerant,
            allow_in: true,
            file: file.to_string(),
            diagnostics: Vec::new(),
        })
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    pub fn parse(&mut self) -> Result<Program> {
        let start = self.scanner.lookahead_start;
        let mut body = Vec::new();
        self.parse_directive_prologue(&mut body)?;

        while self.scanner.lookahead != Token::Eof {
            match self.parse_statement_list_item() {
                Ok(statement) => body.push(statement),
                Err(err) => self.recover(err)?,
            }
        }

        Ok(Program {
            span: self.finalize(start),
            body,
        })
    }

    /// Tolerant-mode error sink: record the syntax error and resynchronize
    /// at the next statement boundary. Strict parse mode propagates.
    fn recover(&mut self, err: SyntaxError) -> Result<()> {
        if !self.tolerant {
            return Err(err);
        }

        let span = Span {
            start: err.pos,
            end: err.pos,
        };
        self.diagnostics.push(Diagnostic::new(
            &self.file,
            span,
            Level::Error,
            codes::PARSE,
            err.cause.to_string(),
        ));

        loop {
            match self.scanner.lookahead {
                // Leave the brace for the enclosing block to consume.
                Token::Eof | Token::CloseCurly => break,
                Token::Semi => {
                    let _ = self.scanner.next_token();
                    break;
                }
                _ => {
                    if self.scanner.next_token().is_err() {
                        break;
                    }
                }
            }
        }
        Ok(())
    }

    fn finalize(&self, start: Position) -> Span {
        Span {
            start,
            end: self.scanner.last_pos,
        }
    }

    fn unexpected_lookahead(&self) -> SyntaxError {
        let cause = match self.scanner.lookahead {
            Token::Eof => ErrorCause::UnexpectedEndOfInput,
            tok => ErrorCause::UnexpectedToken(tok),
        };
        SyntaxError::new(self.scanner.lookahead_start, cause)
    }

    fn expect(&mut self, expected: Token) -> Result<Token> {
        let next = self.scanner.next_token()?;
        if next != expected {
            let cause = match next {
                Token::Eof => ErrorCause::UnexpectedEndOfInput,
                tok => ErrorCause::UnexpectedToken(tok),
            };
            return Err(SyntaxError::new(self.scanner.last_pos, cause));
        }
        Ok(next)
    }

    fn matches_ident(&self, text: &str) -> bool {
        matches!(self.scanner.lookahead, Token::Ident(sym) if sym.as_str() == text)
    }

    fn consume_semicolon(&mut self) -> Result<()> {
        if self.scanner.lookahead == Token::Semi {
            self.scanner.next_token()?;
            return Ok(());
        }
        if self.scanner.at_newline()
            || self.scanner.lookahead == Token::CloseCurly
            || self.scanner.is_eof()
        {
            return Ok(());
        }
        Err(self.unexpected_lookahead())
    }

    // ------------------------------------------------------------ statements

    fn parse_directive_prologue(&mut self, body: &mut Vec<Statement>) -> Result<()> {
        while let Token::String(_, cooked) = self.scanner.lookahead {
            let start = self.scanner.lookahead_start;
            let state = self.scanner.save_state();
            self.scanner.next_token()?;
            // A directive is a lone string expression statement.
            let is_directive = matches!(
                self.scanner.lookahead,
                Token::Semi | Token::CloseCurly | Token::Eof
            ) || self.scanner.at_newline();
            self.scanner.restore(state);
            if !is_directive {
                break;
            }

            self.scanner.next_token()?;
            let span = self.finalize(start);
            let expr = Expression::Literal(span, Literal::String(cooked, cooked));
            self.consume_semicolon()?;
            body.push(Statement::Directive(span, expr, cooked));
        }
        Ok(())
    }

    fn parse_statement_list_item(&mut self) -> Result<Statement> {
        match self.scanner.lookahead {
            Token::ImportKeyword => self.parse_import_declaration(),
            Token::ExportKeyword => self.parse_export_declaration(),
            _ => self.parse_statement(),
        }
    }

    fn parse_statement(&mut self) -> Result<Statement> {
        match self.scanner.lookahead {
            Token::Var => self.parse_variable_statement(VariableDeclarationKind::Var),
            Token::Let => self.parse_variable_statement(VariableDeclarationKind::Let),
            Token::Const => self.parse_variable_statement(VariableDeclarationKind::Const),
            Token::FunctionKeyword => self.parse_function().map(Statement::FunctionDeclaration),
            Token::ClassKeyword => self.parse_class_declaration(),
            Token::If => self.parse_if_statement(),
            Token::ForKeyword => self.parse_for_statement(),
            Token::WhileKeyword => self.parse_while_statement(),
            Token::DoKeyword => self.parse_do_while_statement(),
            Token::SwitchKeyword => self.parse_switch_statement(),
            Token::TryKeyword => self.parse_try_statement(),
            Token::ThrowKeyword => self.parse_throw_statement(),
            Token::Return => self.parse_return_statement(),
            Token::BreakKeyword => self.parse_break_statement(),
            Token::ContinueKeyword => self.parse_continue_statement(),
            Token::WithKeyword => self.parse_with_statement(),
            Token::OpenCurly => self.parse_block().map(Statement::Block),
            Token::Semi => {
                let start = self.scanner.lookahead_start;
                self.scanner.next_token()?;
                Ok(Statement::Empty(self.finalize(start)))
            }
            Token::DebuggerKeyword => {
                let start = self.scanner.lookahead_start;
                self.scanner.next_token()?;
                self.consume_semicolon()?;
                Ok(Statement::Debugger(self.finalize(start)))
            }
            Token::Ident(name) => self.parse_labeled_or_expression_statement(name),
            _ => self.parse_expression_statement(),
        }
    }

    fn parse_labeled_or_expression_statement(&mut self, name: Symbol) -> Result<Statement> {
        let start = self.scanner.lookahead_start;
        let state = self.scanner.save_state();
        self.scanner.next_token()?;
        if self.scanner.lookahead == Token::Colon {
            let label = Id(self.finalize(start), name);
            self.scanner.next_token()?;
            let body = self.parse_statement()?;
            return Ok(Statement::Labeled(
                self.finalize(start),
                label,
                Box::new(body),
            ));
        }
        self.scanner.restore(state);
        self.parse_expression_statement()
    }

    fn parse_expression_statement(&mut self) -> Result<Statement> {
        let start = self.scanner.lookahead_start;
        let expr = self.parse_expression()?;
        self.consume_semicolon()?;
        Ok(Statement::Expression(self.finalize(start), expr))
    }

    fn parse_variable_statement(&mut self, kind: VariableDeclarationKind) -> Result<Statement> {
        let declaration = self.parse_variable_declaration(kind)?;
        self.consume_semicolon()?;
        Ok(Statement::VariableDeclaration(declaration))
    }

    fn parse_variable_declaration(
        &mut self,
        kind: VariableDeclarationKind,
    ) -> Result<VariableDeclaration> {
        let start = self.scanner.lookahead_start;
        self.scanner.next_token()?;
        let mut declarations = vec![self.parse_variable_declarator()?];

        while self.scanner.lookahead == Token::Comma {
            self.scanner.next_token()?;
            declarations.push(self.parse_variable_declarator()?);
        }

        Ok(VariableDeclaration {
            span: self.finalize(start),
            kind,
            declarations,
        })
    }

    fn parse_variable_declarator(&mut self) -> Result<VariableDeclarator> {
        let start = self.scanner.lookahead_start;
        let id = self.parse_binding_pattern()?;
        let init = if self.scanner.lookahead == Token::Eq {
            self.scanner.next_token()?;
            Some(self.parse_assignment_expression()?)
        } else {
            None
        };

        Ok(VariableDeclarator {
            span: self.finalize(start),
            id,
            init,
        })
    }

    fn parse_if_statement(&mut self) -> Result<Statement> {
        let start = self.scanner.lookahead_start;
        self.expect(Token::If)?;
        self.expect(Token::OpenParen)?;
        let test = self.parse_expression()?;
        self.expect(Token::CloseParen)?;
        let consequent = self.parse_statement()?;
        let alternate = if self.scanner.lookahead == Token::Else {
            self.scanner.next_token()?;
            Some(Box::new(self.parse_statement()?))
        } else {
            None
        };

        Ok(Statement::If(
            self.finalize(start),
            test,
            Box::new(consequent),
            alternate,
        ))
    }

    fn parse_for_statement(&mut self) -> Result<Statement> {
        let start = self.scanner.lookahead_start;
        self.expect(Token::ForKeyword)?;
        self.expect(Token::OpenParen)?;

        if self.scanner.lookahead == Token::Semi {
            self.scanner.next_token()?;
            return self.parse_for_tail(start, None);
        }

        let decl_kind = match self.scanner.lookahead {
            Token::Var => Some(VariableDeclarationKind::Var),
            Token::Let => Some(VariableDeclarationKind::Let),
            Token::Const => Some(VariableDeclarationKind::Const),
            _ => None,
        };

        if let Some(kind) = decl_kind {
            let decl_start = self.scanner.lookahead_start;
            self.scanner.next_token()?;
            let first = {
                let item_start = self.scanner.lookahead_start;
                let id = self.parse_binding_pattern()?;
                if self.scanner.lookahead == Token::In || self.matches_ident("of") {
                    let of = self.matches_ident("of");
                    self.scanner.next_token()?;
                    let right = self.parse_assignment_expression()?;
                    self.expect(Token::CloseParen)?;
                    let body = self.parse_statement()?;
                    let declaration = VariableDeclaration {
                        span: self.finalize(item_start),
                        kind,
                        declarations: vec![VariableDeclarator {
                            span: self.finalize(item_start),
                            id,
                            init: None,
                        }],
                    };
                    let each = ForEachStatement {
                        left: ForTarget::VarDecl(declaration),
                        right,
                        body,
                    };
                    let span = self.finalize(start);
                    return Ok(if of {
                        Statement::ForOf(span, Box::new(each))
                    } else {
                        Statement::ForIn(span, Box::new(each))
                    });
                }

                let init = if self.scanner.lookahead == Token::Eq {
                    self.scanner.next_token()?;
                    self.allow_in = false;
                    let expr = self.parse_assignment_expression();
                    self.allow_in = true;
                    Some(expr?)
                } else {
                    None
                };
                VariableDeclarator {
                    span: self.finalize(item_start),
                    id,
                    init,
                }
            };

            let mut declarations = vec![first];
            while self.scanner.lookahead == Token::Comma {
                self.scanner.next_token()?;
                declarations.push(self.parse_variable_declarator()?);
            }
            let declaration = VariableDeclaration {
                span: self.finalize(decl_start),
                kind,
                declarations,
            };
            self.expect(Token::Semi)?;
            return self.parse_for_tail(start, Some(ForInit::VarDecl(declaration)));
        }

        self.allow_in = false;
        let init = self.parse_expression();
        self.allow_in = true;
        let init = init?;

        if self.scanner.lookahead == Token::In || self.matches_ident("of") {
            let of = self.matches_ident("of");
            self.scanner.next_token()?;
            let left = ForTarget::Target(self.expression_to_assign_target(init)?);
            let right = self.parse_assignment_expression()?;
            self.expect(Token::CloseParen)?;
            let body = self.parse_statement()?;
            let each = ForEachStatement { left, right, body };
            let span = self.finalize(start);
            return Ok(if of {
                Statement::ForOf(span, Box::new(each))
            } else {
                Statement::ForIn(span, Box::new(each))
            });
        }

        self.expect(Token::Semi)?;
        self.parse_for_tail(start, Some(ForInit::Expression(init)))
    }

    fn parse_for_tail(&mut self, start: Position, init: Option<ForInit>) -> Result<Statement> {
        let test = if self.scanner.lookahead == Token::Semi {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect(Token::Semi)?;

        let update = if self.scanner.lookahead == Token::CloseParen {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect(Token::CloseParen)?;

        let body = self.parse_statement()?;
        Ok(Statement::For(
            self.finalize(start),
            Box::new(ForStatement {
                init,
                test,
                update,
                body,
            }),
        ))
    }

    fn parse_while_statement(&mut self) -> Result<Statement> {
        let start = self.scanner.lookahead_start;
        self.expect(Token::WhileKeyword)?;
        self.expect(Token::OpenParen)?;
        let test = self.parse_expression()?;
        self.expect(Token::CloseParen)?;
        let body = self.parse_statement()?;
        Ok(Statement::While(self.finalize(start), test, Box::new(body)))
    }

    fn parse_do_while_statement(&mut self) -> Result<Statement> {
        let start = self.scanner.lookahead_start;
        self.expect(Token::DoKeyword)?;
        let body = self.parse_statement()?;
        self.expect(Token::WhileKeyword)?;
        self.expect(Token::OpenParen)?;
        let test = self.parse_expression()?;
        self.expect(Token::CloseParen)?;
        if self.scanner.lookahead == Token::Semi {
            self.scanner.next_token()?;
        }
        Ok(Statement::DoWhile(self.finalize(start), Box::new(body), test))
    }

    fn parse_switch_statement(&mut self) -> Result<Statement> {
        let start = self.scanner.lookahead_start;
        self.expect(Token::SwitchKeyword)?;
        self.expect(Token::OpenParen)?;
        let discriminant = self.parse_expression()?;
        self.expect(Token::CloseParen)?;
        self.expect(Token::OpenCurly)?;

        let mut cases = Vec::new();
        while self.scanner.lookahead != Token::CloseCurly {
            let case_start = self.scanner.lookahead_start;
            let test = match self.scanner.next_token()? {
                Token::CaseKeyword => Some(self.parse_expression()?),
                Token::DefaultKeyword => None,
                tok => {
                    return Err(SyntaxError::new(
                        self.scanner.last_pos,
                        ErrorCause::UnexpectedToken(tok),
                    ))
                }
            };
            self.expect(Token::Colon)?;

            let mut consequent = Vec::new();
            loop {
                match self.scanner.lookahead {
                    Token::CloseCurly | Token::CaseKeyword | Token::DefaultKeyword => break,
                    _ => consequent.push(self.parse_statement_list_item()?),
                }
            }
            cases.push(SwitchCase {
                span: self.finalize(case_start),
                test,
                consequent,
            });
        }
        self.expect(Token::CloseCurly)?;

        Ok(Statement::Switch(self.finalize(start), discriminant, cases))
    }

    fn parse_try_statement(&mut self) -> Result<Statement> {
        let start = self.scanner.lookahead_start;
        self.expect(Token::TryKeyword)?;
        let block = self.parse_block()?;

        let handler = if self.scanner.lookahead == Token::CatchKeyword {
            let catch_start = self.scanner.lookahead_start;
            self.scanner.next_token()?;
            let param = if self.scanner.lookahead == Token::OpenParen {
                self.scanner.next_token()?;
                let pattern = self.parse_binding_pattern()?;
                self.expect(Token::CloseParen)?;
                Some(pattern)
            } else {
                None
            };
            let body = self.parse_block()?;
            Some(CatchClause {
                span: self.finalize(catch_start),
                param,
                body,
            })
        } else {
            None
        };

        let finalizer = if self.scanner.lookahead == Token::FinallyKeyword {
            self.scanner.next_token()?;
            Some(self.parse_block()?)
        } else {
            None
        };

        if handler.is_none() && finalizer.is_none() {
            return Err(self.unexpected_lookahead());
        }

        Ok(Statement::Try(self.finalize(start), block, handler, finalizer))
    }

    fn parse_throw_statement(&mut self) -> Result<Statement> {
        let start = self.scanner.lookahead_start;
        self.expect(Token::ThrowKeyword)?;
        if self.scanner.at_newline() {
            return Err(self.unexpected_lookahead());
        }
        let argument = self.parse_expression()?;
        self.consume_semicolon()?;
        Ok(Statement::Throw(self.finalize(start), argument))
    }

    fn parse_return_statement(&mut self) -> Result<Statement> {
        let start = self.scanner.lookahead_start;
        self.expect(Token::Return)?;
        let argument = if self.scanner.at_newline()
            || matches!(
                self.scanner.lookahead,
                Token::Semi | Token::CloseCurly | Token::Eof
            ) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.consume_semicolon()?;
        Ok(Statement::Return(self.finalize(start), argument))
    }

    fn parse_break_statement(&mut self) -> Result<Statement> {
        let start = self.scanner.lookahead_start;
        self.expect(Token::BreakKeyword)?;
        let label = self.parse_optional_label()?;
        self.consume_semicolon()?;
        Ok(Statement::Break(self.finalize(start), label))
    }

    fn parse_continue_statement(&mut self) -> Result<Statement> {
        let start = self.scanner.lookahead_start;
        self.expect(Token::ContinueKeyword)?;
        let label = self.parse_optional_label()?;
        self.consume_semicolon()?;
        Ok(Statement::Continue(self.finalize(start), label))
    }

    fn parse_optional_label(&mut self) -> Result<Option<Id>> {
        if self.scanner.at_newline() {
            return Ok(None);
        }
        if let Token::Ident(name) = self.scanner.lookahead {
            let start = self.scanner.lookahead_start;
            self.scanner.next_token()?;
            return Ok(Some(Id(self.finalize(start), name)));
        }
        Ok(None)
    }

    fn parse_with_statement(&mut self) -> Result<Statement> {
        let start = self.scanner.lookahead_start;
        self.expect(Token::WithKeyword)?;
        self.expect(Token::OpenParen)?;
        let object = self.parse_expression()?;
        self.expect(Token::CloseParen)?;
        let body = self.parse_statement()?;
        Ok(Statement::With(self.finalize(start), object, Box::new(body)))
    }

    fn parse_block(&mut self) -> Result<Block> {
        let start = self.scanner.lookahead_start;
        self.expect(Token::OpenCurly)?;
        let mut statements = Vec::new();

        while self.scanner.lookahead != Token::CloseCurly {
            if self.scanner.is_eof() {
                return Err(self.unexpected_lookahead());
            }
            match self.parse_statement_list_item() {
                Ok(statement) => statements.push(statement),
                Err(err) => self.recover(err)?,
            }
        }

        self.expect(Token::CloseCurly)?;
        Ok(Block(self.finalize(start), statements))
    }

    // ------------------------------------------------------------- functions

    fn parse_function(&mut self) -> Result<Function> {
        let start = self.scanner.lookahead_start;
        self.expect(Token::FunctionKeyword)?;

        let generator = if self.scanner.lookahead == Token::Times {
            self.scanner.next_token()?;
            true
        } else {
            false
        };

        let id = if let Token::Ident(name) = self.scanner.lookahead {
            let id_start = self.scanner.lookahead_start;
            self.scanner.next_token()?;
            Some(Id(self.finalize(id_start), name))
        } else {
            None
        };

        let parameters = self.parse_function_parameters()?;
        let body = self.parse_block()?;

        Ok(Function {
            span: self.finalize(start),
            id,
            parameters,
            body,
            generator,
            is_async: false,
        })
    }

    fn parse_function_parameters(&mut self) -> Result<Vec<Pattern>> {
        self.expect(Token::OpenParen)?;
        let mut parameters = Vec::new();

        loop {
            if self.scanner.lookahead == Token::CloseParen {
                break;
            }
            if self.scanner.lookahead == Token::Ellipsis {
                let start = self.scanner.lookahead_start;
                self.scanner.next_token()?;
                let pattern = self.parse_binding_pattern()?;
                parameters.push(Pattern::Rest(self.finalize(start), Box::new(pattern)));
                if self.scanner.lookahead != Token::CloseParen {
                    return Err(SyntaxError::new(
                        self.scanner.lookahead_start,
                        ErrorCause::RestMustBeLast,
                    ));
                }
                break;
            }

            parameters.push(self.parse_binding_element()?);
            if self.scanner.lookahead == Token::CloseParen {
                break;
            }
            self.expect(Token::Comma)?;
        }

        self.expect(Token::CloseParen)?;
        Ok(parameters)
    }

    fn parse_binding_element(&mut self) -> Result<Pattern> {
        let start = self.scanner.lookahead_start;
        let pattern = self.parse_binding_pattern()?;
        if self.scanner.lookahead == Token::Eq {
            self.scanner.next_token()?;
            let default = self.parse_assignment_expression()?;
            return Ok(Pattern::Assignment {
                span: self.finalize(start),
                target: Box::new(pattern),
                default: Box::new(default),
            });
        }
        Ok(pattern)
    }

    fn parse_binding_pattern(&mut self) -> Result<Pattern> {
        match self.scanner.lookahead {
            Token::Ident(name) => {
                let start = self.scanner.lookahead_start;
                self.scanner.next_token()?;
                Ok(Pattern::Identifier(Id(self.finalize(start), name)))
            }
            Token::OpenSquare => self.parse_array_pattern(),
            Token::OpenCurly => self.parse_object_pattern(),
            _ => Err(SyntaxError::new(
                self.scanner.lookahead_start,
                ErrorCause::InvalidPattern,
            )),
        }
    }

    fn parse_array_pattern(&mut self) -> Result<Pattern> {
        let start = self.scanner.lookahead_start;
        self.expect(Token::OpenSquare)?;
        let mut elements = Vec::new();

        loop {
            match self.scanner.lookahead {
                Token::CloseSquare => break,
                Token::Comma => {
                    self.scanner.next_token()?;
                    elements.push(None);
                    continue;
                }
                Token::Ellipsis => {
                    let rest_start = self.scanner.lookahead_start;
                    self.scanner.next_token()?;
                    let pattern = self.parse_binding_pattern()?;
                    elements.push(Some(Pattern::Rest(
                        self.finalize(rest_start),
                        Box::new(pattern),
                    )));
                    if self.scanner.lookahead != Token::CloseSquare {
                        return Err(SyntaxError::new(
                            self.scanner.lookahead_start,
                            ErrorCause::RestMustBeLast,
                        ));
                    }
                    break;
                }
                _ => elements.push(Some(self.parse_binding_element()?)),
            }

            if self.scanner.lookahead != Token::CloseSquare {
                self.expect(Token::Comma)?;
            }
        }

        self.expect(Token::CloseSquare)?;
        Ok(Pattern::Array {
            span: self.finalize(start),
            elements,
        })
    }

    fn parse_object_pattern(&mut self) -> Result<Pattern> {
        let start = self.scanner.lookahead_start;
        self.expect(Token::OpenCurly)?;
        let mut properties = Vec::new();
        let mut rest = None;

        loop {
            if self.scanner.lookahead == Token::CloseCurly {
                break;
            }
            if self.scanner.lookahead == Token::Ellipsis {
                self.scanner.next_token()?;
                match self.scanner.lookahead {
                    Token::Ident(name) => {
                        let id_start = self.scanner.lookahead_start;
                        self.scanner.next_token()?;
                        rest = Some(Id(self.finalize(id_start), name));
                    }
                    _ => {
                        return Err(SyntaxError::new(
                            self.scanner.lookahead_start,
                            ErrorCause::InvalidPattern,
                        ))
                    }
                }
                if self.scanner.lookahead != Token::CloseCurly {
                    return Err(SyntaxError::new(
                        self.scanner.lookahead_start,
                        ErrorCause::RestMustBeLast,
                    ));
                }
                break;
            }

            let prop_start = self.scanner.lookahead_start;
            let key = self.parse_property_key()?;
            let (value, shorthand) = if self.scanner.lookahead == Token::Colon {
                self.scanner.next_token()?;
                (self.parse_binding_element()?, false)
            } else {
                let id = match key {
                    PropKey::Identifier(id) => id,
                    _ => {
                        return Err(SyntaxError::new(
                            self.scanner.lookahead_start,
                            ErrorCause::InvalidPattern,
                        ))
                    }
                };
                let pattern = Pattern::Identifier(id);
                if self.scanner.lookahead == Token::Eq {
                    self.scanner.next_token()?;
                    let default = self.parse_assignment_expression()?;
                    (
                        Pattern::Assignment {
                            span: self.finalize(prop_start),
                            target: Box::new(pattern),
                            default: Box::new(default),
                        },
                        true,
                    )
                } else {
                    (pattern, true)
                }
            };

            properties.push(PropPattern {
                span: self.finalize(prop_start),
                key,
                value,
                shorthand,
            });

            if self.scanner.lookahead != Token::CloseCurly {
                self.expect(Token::Comma)?;
            }
        }

        self.expect(Token::CloseCurly)?;
        Ok(Pattern::Object {
            span: self.finalize(start),
            properties,
            rest,
        })
    }

    // --------------------------------------------------------------- classes

    fn parse_class_declaration(&mut self) -> Result<Statement> {
        let start = self.scanner.lookahead_start;
        let decl = self.parse_class_tail(true)?;
        Ok(Statement::ClassDeclaration(self.finalize(start), decl))
    }

    fn parse_class_tail(&mut self, require_id: bool) -> Result<ClassDecl> {
        self.expect(Token::ClassKeyword)?;

        let id = if let Token::Ident(name) = self.scanner.lookahead {
            let id_start = self.scanner.lookahead_start;
            self.scanner.next_token()?;
            Some(Id(self.finalize(id_start), name))
        } else if require_id {
            return Err(self.unexpected_lookahead());
        } else {
            None
        };

        let super_class = if self.scanner.lookahead == Token::ExtendsKeyword {
            self.scanner.next_token()?;
            Some(Box::new(self.parse_lhs_expression(true)?))
        } else {
            None
        };

        self.expect(Token::OpenCurly)?;
        let mut body = Vec::new();
        while self.scanner.lookahead != Token::CloseCurly {
            if self.scanner.lookahead == Token::Semi {
                self.scanner.next_token()?;
                continue;
            }
            body.push(self.parse_method_definition()?);
        }
        self.expect(Token::CloseCurly)?;

        Ok(ClassDecl {
            id,
            super_class,
            body,
        })
    }

    fn parse_method_definition(&mut self) -> Result<MethodDefinition> {
        let start = self.scanner.lookahead_start;

        let is_static = if self.matches_ident("static") {
            let state = self.scanner.save_state();
            self.scanner.next_token()?;
            // `static` itself can be a method name.
            if self.scanner.lookahead == Token::OpenParen {
                self.scanner.restore(state);
                false
            } else {
                true
            }
        } else {
            false
        };

        let generator = if self.scanner.lookahead == Token::Times {
            self.scanner.next_token()?;
            true
        } else {
            false
        };

        let mut kind = MethodKind::Method;
        if !generator && (self.matches_ident("get") || self.matches_ident("set")) {
            let is_get = self.matches_ident("get");
            let state = self.scanner.save_state();
            self.scanner.next_token()?;
            if self.scanner.lookahead == Token::OpenParen {
                self.scanner.restore(state);
            } else {
                kind = if is_get { MethodKind::Get } else { MethodKind::Set };
            }
        }

        let key = self.parse_property_key()?;
        if kind == MethodKind::Method {
            if let Some(name) = key.static_name() {
                if name == intern::KW_CONSTRUCTOR && !is_static {
                    kind = MethodKind::Constructor;
                }
            }
        }

        let fn_start = self.scanner.lookahead_start;
        let parameters = self.parse_function_parameters()?;
        let body = self.parse_block()?;
        let value = Function {
            span: self.finalize(fn_start),
            id: None,
            parameters,
            body,
            generator,
            is_async: false,
        };

        Ok(MethodDefinition {
            span: self.finalize(start),
            key,
            value,
            kind,
            is_static,
        })
    }

    fn parse_property_key(&mut self) -> Result<PropKey> {
        let start = self.scanner.lookahead_start;
        match self.scanner.lookahead {
            Token::Ident(name) => {
                self.scanner.next_token()?;
                Ok(PropKey::Identifier(Id(self.finalize(start), name)))
            }
            Token::String(_, cooked) => {
                self.scanner.next_token()?;
                Ok(PropKey::String(self.finalize(start), cooked))
            }
            Token::Number(value) => {
                self.scanner.next_token()?;
                Ok(PropKey::Number(self.finalize(start), value))
            }
            Token::OpenSquare => {
                self.scanner.next_token()?;
                let expr = self.parse_assignment_expression()?;
                self.expect(Token::CloseSquare)?;
                Ok(PropKey::Computed(self.finalize(start), Box::new(expr)))
            }
            // Keywords are valid property names.
            tok => {
                let text = keyword_text(tok).ok_or_else(|| self.unexpected_lookahead())?;
                self.scanner.next_token()?;
                Ok(PropKey::Identifier(Id(
                    self.finalize(start),
                    intern::intern(text),
                )))
            }
        }
    }

    // ---------------------------------------------------------- import/export

    fn parse_import_declaration(&mut self) -> Result<Statement> {
        let start = self.scanner.lookahead_start;
        if self.mode != Mode::Module {
            return Err(SyntaxError::new(start, ErrorCause::ImportOutsideModule));
        }
        self.expect(Token::ImportKeyword)?;

        // Side-effect-only import: `import "m"`.
        if let Token::String(_, cooked) = self.scanner.lookahead {
            let source_start = self.scanner.lookahead_start;
            self.scanner.next_token()?;
            let source = (self.finalize(source_start), cooked);
            self.consume_semicolon()?;
            return Ok(Statement::Import(ImportDeclaration {
                span: self.finalize(start),
                specifiers: Vec::new(),
                source,
            }));
        }

        let mut specifiers = Vec::new();

        match self.scanner.lookahead {
            Token::Ident(name) => {
                let id_start = self.scanner.lookahead_start;
                self.scanner.next_token()?;
                specifiers.push(ImportSpecifier::Default(Id(self.finalize(id_start), name)));
                if self.scanner.lookahead == Token::Comma {
                    self.scanner.next_token()?;
                    self.parse_import_specifier_group(&mut specifiers)?;
                }
            }
            _ => self.parse_import_specifier_group(&mut specifiers)?,
        }

        if !self.matches_ident("from") {
            return Err(self.unexpected_lookahead());
        }
        self.scanner.next_token()?;

        let source = match self.scanner.lookahead {
            Token::String(_, cooked) => {
                let source_start = self.scanner.lookahead_start;
                self.scanner.next_token()?;
                (self.finalize(source_start), cooked)
            }
            _ => return Err(self.unexpected_lookahead()),
        };
        self.consume_semicolon()?;

        Ok(Statement::Import(ImportDeclaration {
            span: self.finalize(start),
            specifiers,
            source,
        }))
    }

    fn parse_import_specifier_group(
        &mut self,
        specifiers: &mut Vec<ImportSpecifier>,
    ) -> Result<()> {
        match self.scanner.lookahead {
            Token::Times => {
                let star_start = self.scanner.lookahead_start;
                self.scanner.next_token()?;
                if !self.matches_ident("as") {
                    return Err(self.unexpected_lookahead());
                }
                self.scanner.next_token()?;
                match self.scanner.lookahead {
                    Token::Ident(name) => {
                        let id_start = self.scanner.lookahead_start;
                        self.scanner.next_token()?;
                        specifiers.push(ImportSpecifier::Namespace(
                            self.finalize(star_start),
                            Id(self.finalize(id_start), name),
                        ));
                        Ok(())
                    }
                    _ => Err(self.unexpected_lookahead()),
                }
            }
            Token::OpenCurly => {
                self.scanner.next_token()?;
                while self.scanner.lookahead != Token::CloseCurly {
                    let spec_start = self.scanner.lookahead_start;
                    let imported = match self.scanner.lookahead {
                        Token::Ident(name) => {
                            self.scanner.next_token()?;
                            Id(self.finalize(spec_start), name)
                        }
                        Token::DefaultKeyword => {
                            self.scanner.next_token()?;
                            Id(self.finalize(spec_start), intern::KW_DEFAULT)
                        }
                        _ => return Err(self.unexpected_lookahead()),
                    };
                    let local = if self.matches_ident("as") {
                        self.scanner.next_token()?;
                        match self.scanner.lookahead {
                            Token::Ident(name) => {
                                let local_start = self.scanner.lookahead_start;
                                self.scanner.next_token()?;
                                Id(self.finalize(local_start), name)
                            }
                            _ => return Err(self.unexpected_lookahead()),
                        }
                    } else {
                        imported
                    };
                    specifiers.push(ImportSpecifier::Named {
                        span: self.finalize(spec_start),
                        imported,
                        local,
                    });
                    if self.scanner.lookahead != Token::CloseCurly {
                        self.expect(Token::Comma)?;
                    }
                }
                self.expect(Token::CloseCurly)?;
                Ok(())
            }
            _ => Err(self.unexpected_lookahead()),
        }
    }

    fn parse_export_declaration(&mut self) -> Result<Statement> {
        let start = self.scanner.lookahead_start;
        if self.mode != Mode::Module {
            return Err(SyntaxError::new(start, ErrorCause::ExportOutsideModule));
        }
        self.expect(Token::ExportKeyword)?;

        match self.scanner.lookahead {
            Token::DefaultKeyword => {
                self.scanner.next_token()?;
                let expr = match self.scanner.lookahead {
                    Token::FunctionKeyword => Expression::Function(self.parse_function()?),
                    Token::ClassKeyword => {
                        let class_start = self.scanner.lookahead_start;
                        let decl = self.parse_class_tail(false)?;
                        Expression::Class(self.finalize(class_start), decl)
                    }
                    _ => {
                        let expr = self.parse_assignment_expression()?;
                        self.consume_semicolon()?;
                        expr
                    }
                };
                Ok(Statement::Export(ExportDeclaration::Default(
                    self.finalize(start),
                    Box::new(expr),
                )))
            }
            Token::OpenCurly => {
                self.scanner.next_token()?;
                let mut specifiers = Vec::new();
                while self.scanner.lookahead != Token::CloseCurly {
                    let spec_start = self.scanner.lookahead_start;
                    let local = match self.scanner.lookahead {
                        Token::Ident(name) => {
                            self.scanner.next_token()?;
                            Id(self.finalize(spec_start), name)
                        }
                        Token::DefaultKeyword => {
                            self.scanner.next_token()?;
                            Id(self.finalize(spec_start), intern::KW_DEFAULT)
                        }
                        _ => return Err(self.unexpected_lookahead()),
                    };
                    let exported = if self.matches_ident("as") {
                        self.scanner.next_token()?;
                        match self.scanner.lookahead {
                            Token::Ident(name) => {
                                let exported_start = self.scanner.lookahead_start;
                                self.scanner.next_token()?;
                                Id(self.finalize(exported_start), name)
                            }
                            Token::DefaultKeyword => {
                                let exported_start = self.scanner.lookahead_start;
                                self.scanner.next_token()?;
                                Id(self.finalize(exported_start), intern::KW_DEFAULT)
                            }
                            _ => return Err(self.unexpected_lookahead()),
                        }
                    } else {
                        local
                    };
                    specifiers.push(ExportSpecifier {
                        span: self.finalize(spec_start),
                        local,
                        exported,
                    });
                    if self.scanner.lookahead != Token::CloseCurly {
                        self.expect(Token::Comma)?;
                    }
                }
                self.expect(Token::CloseCurly)?;

                let source = if self.matches_ident("from") {
                    self.scanner.next_token()?;
                    match self.scanner.lookahead {
                        Token::String(_, cooked) => {
                            let source_start = self.scanner.lookahead_start;
                            self.scanner.next_token()?;
                            Some((self.finalize(source_start), cooked))
                        }
                        _ => return Err(self.unexpected_lookahead()),
                    }
                } else {
                    None
                };
                self.consume_semicolon()?;

                Ok(Statement::Export(ExportDeclaration::Named {
                    span: self.finalize(start),
                    specifiers,
                    source,
                }))
            }
            Token::Var | Token::Let | Token::Const
            | Token::FunctionKeyword
            | Token::ClassKeyword => {
                let statement = self.parse_statement()?;
                Ok(Statement::Export(ExportDeclaration::Decl(
                    self.finalize(start),
                    Box::new(statement),
                )))
            }
            _ => Err(self.unexpected_lookahead()),
        }
    }

    // ------------------------------------------------------------ expressions

    pub fn parse_expression(&mut self) -> Result<Expression> {
        let start = self.scanner.lookahead_start;
        let expr = self.parse_assignment_expression()?;

        if self.scanner.lookahead == Token::Comma {
            let mut expressions = vec![expr];
            while self.scanner.lookahead == Token::Comma {
                self.scanner.next_token()?;
                expressions.push(self.parse_assignment_expression()?);
            }
            return Ok(Expression::Sequence(self.finalize(start), expressions));
        }

        Ok(expr)
    }

    fn parse_assignment_expression(&mut self) -> Result<Expression> {
        if matches!(
            self.scanner.lookahead,
            Token::Ident(_) | Token::OpenParen
        ) {
            if let Some(arrow) = self.try_parse_arrow()? {
                return Ok(arrow);
            }
        }

        let start = self.scanner.lookahead_start;
        let left = self.parse_conditional_expression()?;

        if let Some(op) = self.scanner.lookahead.as_assign_op() {
            self.scanner.next_token()?;
            let target = self.expression_to_assign_target(left)?;
            let right = self.parse_assignment_expression()?;
            return Ok(Expression::Assignment(
                self.finalize(start),
                op,
                Box::new(target),
                Box::new(right),
            ));
        }

        Ok(left)
    }

    fn expression_to_assign_target(&self, expr: Expression) -> Result<AssignTarget> {
        match expr {
            Expression::Identifier(id) => Ok(AssignTarget::Identifier(id)),
            Expression::StaticMember(span, object, property) => {
                Ok(AssignTarget::StaticMember(span, object, property))
            }
            Expression::ComputedMember(span, object, property) => {
                Ok(AssignTarget::ComputedMember(span, object, property))
            }
            other => Err(SyntaxError::new(
                other.span().start,
                ErrorCause::InvalidAssignmentTarget,
            )),
        }
    }

    fn try_parse_arrow(&mut self) -> Result<Option<Expression>> {
        let start = self.scanner.lookahead_start;
        let state = self.scanner.save_state();

        let parameters = match self.scanner.lookahead {
            Token::Ident(name) => {
                let id_start = self.scanner.lookahead_start;
                self.scanner.next_token()?;
                vec![Pattern::Identifier(Id(self.finalize(id_start), name))]
            }
            Token::OpenParen => match self.parse_function_parameters() {
                Ok(parameters) => parameters,
                Err(_) => {
                    self.scanner.restore(state);
                    return Ok(None);
                }
            },
            _ => return Ok(None),
        };

        if self.scanner.lookahead != Token::Arrow || self.scanner.at_newline() {
            self.scanner.restore(state);
            return Ok(None);
        }
        self.scanner.next_token()?;

        let body = if self.scanner.lookahead == Token::OpenCurly {
            ArrowBody::Block(self.parse_block()?)
        } else {
            ArrowBody::Expression(Box::new(self.parse_assignment_expression()?))
        };

        Ok(Some(Expression::ArrowFunction(ArrowFunction {
            span: self.finalize(start),
            parameters,
            body,
            is_async: false,
        })))
    }

    fn parse_conditional_expression(&mut self) -> Result<Expression> {
        let start = self.scanner.lookahead_start;
        let test = self.parse_binary_expression()?;

        if self.scanner.lookahead == Token::QuestionMark {
            self.scanner.next_token()?;
            let previous_allow_in = self.allow_in;
            self.allow_in = true;
            let consequent = self.parse_assignment_expression();
            self.allow_in = previous_allow_in;
            let consequent = consequent?;
            self.expect(Token::Colon)?;
            let alternate = self.parse_assignment_expression()?;
            return Ok(Expression::Conditional(
                self.finalize(start),
                Box::new(test),
                Box::new(consequent),
                Box::new(alternate),
            ));
        }

        Ok(test)
    }

    fn combine_binary(
        &self,
        operator: InfixOp,
        left: Expression,
        right: Expression,
        start: Position,
    ) -> Expression {
        let span = Span {
            start,
            end: self.scanner.last_pos,
        };

        match operator {
            InfixOp::BinOp(op) => Expression::Binary(span, op, Box::new(left), Box::new(right)),
            InfixOp::LogOp(op) => Expression::Logical(span, op, Box::new(left), Box::new(right)),
        }
    }

    fn match_infix(&self) -> Option<InfixOp> {
        self.scanner.lookahead.as_infix_op(self.allow_in)
    }

    fn parse_binary_expression(&mut self) -> Result<Expression> {
        let start = self.scanner.lookahead_start;

        let mut expr = self.parse_unary_expression()?;

        if let Some(first_op) = self.match_infix() {
            self.scanner.next_token()?;
            let mut markers = vec![start, self.scanner.lookahead_start];
            let mut right = self.parse_unary_expression()?;
            let mut expressions = vec![expr, right];
            let mut operators = vec![first_op];

            while let Some(op) = self.match_infix() {
                while expressions.len() > 1
                    && operators.last().map_or(false, |top| top.precedence() >= op.precedence())
                {
                    right = expressions.pop().unwrap();
                    let operator = operators.pop().unwrap();
                    expr = expressions.pop().unwrap();
                    markers.pop();
                    let marker = *markers.last().unwrap();
                    expressions.push(self.combine_binary(operator, expr, right, marker));
                }
                self.scanner.next_token()?;
                operators.push(op);
                markers.push(self.scanner.lookahead_start);
                expressions.push(self.parse_unary_expression()?);
            }

            expr = expressions.pop().unwrap();
            markers.pop();

            while let Some(left) = expressions.pop() {
                let operator = operators.pop().unwrap();
                expr = self.combine_binary(operator, left, expr, markers.pop().unwrap());
            }
        }

        Ok(expr)
    }

    fn parse_unary_expression(&mut self) -> Result<Expression> {
        if let Some(prefix) = self.scanner.lookahead.as_unary_op() {
            let start = self.scanner.lookahead_start;
            self.scanner.next_token()?;
            let expr = self.parse_unary_expression()?;
            return Ok(Expression::Unary(
                self.finalize(start),
                prefix,
                Box::new(expr),
            ));
        }
        self.parse_update_expression()
    }

    fn parse_update_expression(&mut self) -> Result<Expression> {
        let start = self.scanner.lookahead_start;

        if let Some(op) = self.scanner.lookahead.as_update_op() {
            self.scanner.next_token()?;
            let expr = self.parse_unary_expression()?;
            let target = self.expression_to_assign_target(expr)?;
            return Ok(Expression::Update(
                self.finalize(start),
                op,
                Box::new(target),
                true,
            ));
        }

        let expr = self.parse_lhs_expression(true)?;
        if !self.scanner.at_newline() {
            if let Some(op) = self.scanner.lookahead.as_update_op() {
                self.scanner.next_token()?;
                let target = self.expression_to_assign_target(expr)?;
                return Ok(Expression::Update(
                    self.finalize(start),
                    op,
                    Box::new(target),
                    false,
                ));
            }
        }
        Ok(expr)
    }

    fn parse_new_expression(&mut self) -> Result<Expression> {
        let start = self.scanner.lookahead_start;
        self.expect(Token::New)?;
        let base = self.parse_lhs_expression(false)?;
        let args = if self.scanner.lookahead == Token::OpenParen {
            self.parse_arguments()?
        } else {
            Vec::new()
        };
        Ok(Expression::New(self.finalize(start), Box::new(base), args))
    }

    fn parse_lhs_expression(&mut self, allow_call: bool) -> Result<Expression> {
        let start = self.scanner.lookahead_start;

        let mut result = if self.scanner.lookahead == Token::New {
            self.parse_new_expression()?
        } else {
            self.parse_primary_expression()?
        };

        loop {
            match self.scanner.lookahead {
                Token::OpenParen => {
                    if allow_call {
                        let args = self.parse_arguments()?;
                        let span = self.finalize(start);
                        result = Expression::Call(span, Box::new(result), args);
                    } else {
                        break;
                    }
                }
                Token::OpenSquare => {
                    self.expect(Token::OpenSquare)?;
                    let previous_allow_in = self.allow_in;
                    self.allow_in = true;
                    let expr = self.parse_expression();
                    self.allow_in = previous_allow_in;
                    let expr = expr?;
                    self.expect(Token::CloseSquare)?;
                    let span = self.finalize(start);
                    result = Expression::ComputedMember(span, Box::new(result), Box::new(expr));
                }
                Token::Dot => {
                    self.scanner.next_token()?;
                    let token = self.scanner.next_token()?;
                    let name = match token {
                        Token::Ident(name) => name,
                        tok => match keyword_text(tok) {
                            Some(text) => intern::intern(text),
                            None => {
                                return Err(SyntaxError::new(
                                    self.scanner.last_pos,
                                    ErrorCause::UnexpectedToken(token),
                                ))
                            }
                        },
                    };
                    result = Expression::StaticMember(self.finalize(start), Box::new(result), name);
                }
                _ => break,
            }
        }

        Ok(result)
    }

    fn parse_arguments(&mut self) -> Result<Vec<Argument>> {
        self.expect(Token::OpenParen)?;
        let mut arguments = Vec::new();

        loop {
            if self.scanner.lookahead == Token::CloseParen {
                break;
            }
            if self.scanner.lookahead == Token::Ellipsis {
                let start = self.scanner.lookahead_start;
                self.scanner.next_token()?;
                let expr = self.parse_assignment_expression()?;
                arguments.push(Argument::Spread(self.finalize(start), expr));
            } else {
                arguments.push(Argument::Expression(self.parse_assignment_expression()?));
            }

            if self.scanner.lookahead != Token::CloseParen {
                self.expect(Token::Comma)?;
            }
        }

        self.expect(Token::CloseParen)?;
        Ok(arguments)
    }

    fn parse_primary_expression(&mut self) -> Result<Expression> {
        let start = self.scanner.lookahead_start;
        match self.scanner.lookahead {
            Token::Number(n) => {
                self.scanner.next_token()?;
                Ok(Expression::Literal(self.finalize(start), Literal::Number(n)))
            }
            Token::String(raw, cooked) => {
                self.scanner.next_token()?;
                Ok(Expression::Literal(
                    self.finalize(start),
                    Literal::String(raw, cooked),
                ))
            }
            Token::BackTick => self.parse_template_literal(),
            Token::Div | Token::DivEq => {
                let regex = self.scanner.regex_token()?;
                Ok(Expression::Literal(self.finalize(start), regex))
            }
            Token::Ident(name) => {
                self.scanner.next_token()?;
                Ok(Expression::Identifier(Id(self.finalize(start), name)))
            }
            Token::BoolTrue => {
                self.scanner.next_token()?;
                Ok(Expression::Literal(self.finalize(start), Literal::True))
            }
            Token::BoolFalse => {
                self.scanner.next_token()?;
                Ok(Expression::Literal(self.finalize(start), Literal::False))
            }
            Token::Null => {
                self.scanner.next_token()?;
                Ok(Expression::Literal(self.finalize(start), Literal::Null))
            }
            Token::ThisKeyword => {
                self.scanner.next_token()?;
                Ok(Expression::This(self.finalize(start)))
            }
            Token::SuperKeyword => {
                self.scanner.next_token()?;
                Ok(Expression::Identifier(Id(
                    self.finalize(start),
                    intern::intern("super"),
                )))
            }
            Token::FunctionKeyword => self.parse_function().map(Expression::Function),
            Token::ClassKeyword => {
                let decl = self.parse_class_tail(false)?;
                Ok(Expression::Class(self.finalize(start), decl))
            }
            Token::OpenSquare => self.parse_array_initializer(),
            Token::OpenCurly => self.parse_object_initializer(),
            Token::OpenParen => self.parse_group_expression(),
            _ => Err(self.unexpected_lookahead()),
        }
    }

    fn parse_group_expression(&mut self) -> Result<Expression> {
        self.expect(Token::OpenParen)?;
        let previous_allow_in = self.allow_in;
        self.allow_in = true;
        let result = self.parse_expression();
        self.allow_in = previous_allow_in;
        let result = result?;
        self.expect(Token::CloseParen)?;
        Ok(result)
    }

    fn parse_template_literal(&mut self) -> Result<Expression> {
        let start = self.scanner.lookahead_start;
        let mut quasis = Vec::new();
        let mut expressions = Vec::new();

        let (head, mut done) = self.scanner.template_element()?;
        quasis.push(head);

        while !done {
            expressions.push(self.parse_expression()?);
            if self.scanner.lookahead != Token::CloseCurly {
                return Err(self.unexpected_lookahead());
            }
            let (element, tail) = self.scanner.template_element()?;
            quasis.push(element);
            done = tail;
        }

        Ok(Expression::TemplateLiteral(
            self.finalize(start),
            Template {
                quasis,
                expressions,
            },
        ))
    }

    fn parse_array_initializer(&mut self) -> Result<Expression> {
        let start = self.scanner.lookahead_start;
        self.expect(Token::OpenSquare)?;
        let mut elements = Vec::new();

        loop {
            match self.scanner.lookahead {
                Token::CloseSquare => break,
                Token::Comma => {
                    let hole_start = self.scanner.lookahead_start;
                    self.scanner.next_token()?;
                    elements.push(ArrayElement::Hole(self.finalize(hole_start)));
                    continue;
                }
                Token::Ellipsis => {
                    let spread_start = self.scanner.lookahead_start;
                    self.scanner.next_token()?;
                    let expr = self.parse_assignment_expression()?;
                    elements.push(ArrayElement::Spread(self.finalize(spread_start), expr));
                }
                _ => elements.push(ArrayElement::Expression(self.parse_assignment_expression()?)),
            }

            if self.scanner.lookahead != Token::CloseSquare {
                self.expect(Token::Comma)?;
            }
        }

        self.expect(Token::CloseSquare)?;
        Ok(Expression::Array(self.finalize(start), elements))
    }

    fn parse_object_initializer(&mut self) -> Result<Expression> {
        let start = self.scanner.lookahead_start;
        self.expect(Token::OpenCurly)?;
        let mut properties = Vec::new();

        while self.scanner.lookahead != Token::CloseCurly {
            properties.push(self.parse_object_property()?);
            if self.scanner.lookahead != Token::CloseCurly {
                self.expect(Token::Comma)?;
            }
        }

        self.expect(Token::CloseCurly)?;
        Ok(Expression::Object(self.finalize(start), properties))
    }

    fn parse_object_property(&mut self) -> Result<Prop> {
        let start = self.scanner.lookahead_start;

        if self.scanner.lookahead == Token::Ellipsis {
            self.scanner.next_token()?;
            let expr = self.parse_assignment_expression()?;
            return Ok(Prop::Spread(self.finalize(start), expr));
        }

        if self.matches_ident("get") || self.matches_ident("set") {
            let is_get = self.matches_ident("get");
            let state = self.scanner.save_state();
            self.scanner.next_token()?;
            match self.scanner.lookahead {
                // `get` / `set` used as a plain key.
                Token::Colon | Token::Comma | Token::CloseCurly | Token::OpenParen => {
                    self.scanner.restore(state);
                }
                _ => {
                    let key = self.parse_property_key()?;
                    let fn_start = self.scanner.lookahead_start;
                    let parameters = self.parse_function_parameters()?;
                    let body = self.parse_block()?;
                    let function = Function {
                        span: self.finalize(fn_start),
                        id: None,
                        parameters,
                        body,
                        generator: false,
                        is_async: false,
                    };
                    let span = self.finalize(start);
                    return Ok(if is_get {
                        Prop::Get(span, key, function)
                    } else {
                        Prop::Set(span, key, function)
                    });
                }
            }
        }

        let key = self.parse_property_key()?;

        match self.scanner.lookahead {
            Token::Colon => {
                self.scanner.next_token()?;
                let value = self.parse_assignment_expression()?;
                Ok(Prop::Init {
                    span: self.finalize(start),
                    key,
                    value,
                    shorthand: false,
                })
            }
            Token::OpenParen => {
                let fn_start = self.scanner.lookahead_start;
                let parameters = self.parse_function_parameters()?;
                let body = self.parse_block()?;
                let function = Function {
                    span: self.finalize(fn_start),
                    id: None,
                    parameters,
                    body,
                    generator: false,
                    is_async: false,
                };
                Ok(Prop::Method(self.finalize(start), key, function))
            }
            _ => match key {
                PropKey::Identifier(id) => Ok(Prop::Init {
                    span: self.finalize(start),
                    key: PropKey::Identifier(id),
                    value: Expression::Identifier(id),
                    shorthand: true,
                }),
                _ => Err(self.unexpected_lookahead()),
            },
        }
    }
}

/// Keywords that are still valid property names after `.` or in literals.
fn keyword_text(token: Token) -> Option<&'static str> {
    match token {
        Token::If => Some("if"),
        Token::Else => Some("else"),
        Token::Null => Some("null"),
        Token::New => Some("new"),
        Token::Delete => Some("delete"),
        Token::Typeof => Some("typeof"),
        Token::Var => Some("var"),
        Token::Let => Some("let"),
        Token::Const => Some("const"),
        Token::In => Some("in"),
        Token::Instanceof => Some("instanceof"),
        Token::DoKeyword => Some("do"),
        Token::WhileKeyword => Some("while"),
        Token::ForKeyword => Some("for"),
        Token::BreakKeyword => Some("break"),
        Token::ContinueKeyword => Some("continue"),
        Token::Return => Some("return"),
        Token::ThrowKeyword => Some("throw"),
        Token::TryKeyword => Some("try"),
        Token::CatchKeyword => Some("catch"),
        Token::FinallyKeyword => Some("finally"),
        Token::SwitchKeyword => Some("switch"),
        Token::CaseKeyword => Some("case"),
        Token::DefaultKeyword => Some("default"),
        Token::ThisKeyword => Some("this"),
        Token::SuperKeyword => Some("super"),
        Token::ClassKeyword => Some("class"),
        Token::ExtendsKeyword => Some("extends"),
        Token::FunctionKeyword => Some("function"),
        Token::ImportKeyword => Some("import"),
        Token::ExportKeyword => Some("export"),
        Token::WithKeyword => Some("with"),
        Token::DebuggerKeyword => Some("debugger"),
        Token::Void => Some("void"),
        Token::BoolTrue => Some("true"),
        Token::BoolFalse => Some("false"),
        Token::YieldKeyword => Some("yield"),
        Token::EnumKeyword => Some("enum"),
        _ => None,
    }
}
