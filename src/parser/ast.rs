use crate::span::Span;
use std::fmt;
use std::rc::Rc;

#[derive(Debug, Clone)]
pub struct Program {
    pub statements: Vec<Stmt>,
}

#[derive(Debug, Clone)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum StmtKind {
    /// Mutates the innermost scope owning `name`, else binds in the current one.
    Assign {
        name: String,
        value: Expr,
    },
    Print(Expr),
    /// Introduces a child scope; yields the value of its last statement.
    Block(Vec<Stmt>),
    If {
        condition: Expr,
        then_branch: Box<Stmt>, // always a Block
        else_branch: Option<Box<Stmt>>, // a Block, or a nested If for elif chains
    },
    While {
        condition: Expr,
        body: Box<Stmt>,
    },
    FunDef {
        name: String,
        params: Vec<String>,
        body: Rc<Stmt>,
    },
    Return(Option<Expr>),
    ExprStmt(Expr),
}

#[derive(Debug, Clone)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum ExprKind {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
    Var(String),
    Unary {
        operator: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        left: Box<Expr>,
        operator: BinOp,
        right: Box<Expr>,
    },
    Compare {
        left: Box<Expr>,
        operator: CmpOp,
        right: Box<Expr>,
    },
    Logical {
        left: Box<Expr>,
        operator: LogicOp,
        right: Box<Expr>,
    },
    Call {
        name: String,
        arguments: Vec<Expr>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicOp {
    And,
    Or,
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
        };
        write!(f, "{}", s)
    }
}

impl fmt::Display for CmpOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CmpOp::Eq => "==",
            CmpOp::Ne => "!=",
            CmpOp::Lt => "<",
            CmpOp::Gt => ">",
            CmpOp::Le => "<=",
            CmpOp::Ge => ">=",
        };
        write!(f, "{}", s)
    }
}

impl fmt::Display for LogicOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicOp::And => write!(f, "and"),
            LogicOp::Or => write!(f, "or"),
        }
    }
}

// Canonical source rendering. Fully parenthesized expressions and explicit
// semicolons, so that re-parsing the rendered text yields an identical tree.

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, stmt) in self.statements.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", stmt)?;
        }
        Ok(())
    }
}

impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            StmtKind::Assign { name, value } => write!(f, "{} = {};", name, value),
            StmtKind::Print(expr) => write!(f, "print {};", expr),
            StmtKind::Block(statements) => {
                write!(f, "{{")?;
                for stmt in statements {
                    write!(f, " {}", stmt)?;
                }
                write!(f, " }}")
            }
            StmtKind::If {
                condition,
                then_branch,
                else_branch,
            } => fmt_if(f, condition, then_branch, else_branch, "if"),
            StmtKind::While { condition, body } => write!(f, "while {} {}", condition, body),
            StmtKind::FunDef { name, params, body } => {
                write!(f, "fun {}({}) {}", name, params.join(", "), body)
            }
            StmtKind::Return(None) => write!(f, "return;"),
            StmtKind::Return(Some(expr)) => write!(f, "return {};", expr),
            StmtKind::ExprStmt(expr) => write!(f, "{};", expr),
        }
    }
}

// An elif chain is a nested If in the else branch; render it back with the
// `elif` keyword rather than an `else` wrapping a block.
fn fmt_if(
    f: &mut fmt::Formatter<'_>,
    condition: &Expr,
    then_branch: &Stmt,
    else_branch: &Option<Box<Stmt>>,
    keyword: &str,
) -> fmt::Result {
    write!(f, "{} {} {}", keyword, condition, then_branch)?;
    match else_branch {
        Some(stmt) => match &stmt.kind {
            StmtKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                write!(f, " ")?;
                fmt_if(f, condition, then_branch, else_branch, "elif")
            }
            _ => write!(f, " else {}", stmt),
        },
        None => Ok(()),
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ExprKind::Int(n) => write!(f, "{}", n),
            ExprKind::Float(x) => {
                if x.fract() == 0.0 && x.is_finite() {
                    write!(f, "{:.1}", x)
                } else {
                    write!(f, "{}", x)
                }
            }
            ExprKind::Str(s) => {
                write!(f, "\"")?;
                for c in s.chars() {
                    match c {
                        '"' => write!(f, "\\\"")?,
                        '\\' => write!(f, "\\\\")?,
                        '\n' => write!(f, "\\n")?,
                        '\t' => write!(f, "\\t")?,
                        _ => write!(f, "{}", c)?,
                    }
                }
                write!(f, "\"")
            }
            ExprKind::Bool(b) => write!(f, "{}", b),
            ExprKind::Var(name) => write!(f, "{}", name),
            ExprKind::Unary { operator, operand } => match operator {
                UnaryOp::Neg => write!(f, "(-{})", operand),
                UnaryOp::Not => write!(f, "(not {})", operand),
            },
            ExprKind::Binary {
                left,
                operator,
                right,
            } => write!(f, "({} {} {})", left, operator, right),
            ExprKind::Compare {
                left,
                operator,
                right,
            } => write!(f, "({} {} {})", left, operator, right),
            ExprKind::Logical {
                left,
                operator,
                right,
            } => write!(f, "({} {} {})", left, operator, right),
            ExprKind::Call { name, arguments } => {
                write!(f, "{}(", name)?;
                for (i, arg) in arguments.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
        }
    }
}
