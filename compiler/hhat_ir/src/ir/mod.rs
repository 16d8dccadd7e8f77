//! IR node tree consumed by the resolution engine.
//!
//! The node set is closed: five instructions (`Declare`, `Assign`,
//! `DeclareAssign`, `Call`, `Cast`) and four blocks (`Args`, `ArgsValues`,
//! `Body`, `Option`). Front-ends build these values directly.

use std::fmt;

use crate::{IrError, Symbol, SymbolPath, WorkingData};

/// Instruction tag, mostly for tracing and diagnostics.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum IrFlag {
    Declare,
    Assign,
    DeclareAssign,
    Call,
    CallWithOption,
    CallWithBody,
    Cast,
}

impl IrFlag {
    pub fn as_str(self) -> &'static str {
        match self {
            IrFlag::Declare => "declare",
            IrFlag::Assign => "assign",
            IrFlag::DeclareAssign => "declare-assign",
            IrFlag::Call => "call",
            IrFlag::CallWithOption => "call-with-option",
            IrFlag::CallWithBody => "call-with-body",
            IrFlag::Cast => "cast",
        }
    }
}

impl fmt::Display for IrFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Block tag.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum BlockFlag {
    Args,
    ArgsValues,
    Body,
    Option,
}

impl BlockFlag {
    pub fn as_str(self) -> &'static str {
        match self {
            BlockFlag::Args => "args",
            BlockFlag::ArgsValues => "args-values",
            BlockFlag::Body => "body",
            BlockFlag::Option => "option",
        }
    }
}

/// Value position inside an instruction or block.
#[derive(Clone, PartialEq, Debug)]
pub enum Operand {
    Data(WorkingData),
    Instr(Box<Instr>),
    Block(Box<Block>),
}

macro_rules! operand_from_data {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Operand {
                fn from(data: $ty) -> Self {
                    Operand::Data(data.into())
                }
            }
        )*
    };
}

operand_from_data!(
    WorkingData,
    Symbol,
    crate::CompositeSymbol,
    crate::CoreLiteral,
    crate::CompositeLiteral,
);

impl From<Instr> for Operand {
    fn from(instr: Instr) -> Self {
        Operand::Instr(Box::new(instr))
    }
}

impl From<Block> for Operand {
    fn from(block: Block) -> Self {
        Operand::Block(Box::new(block))
    }
}

#[derive(Clone, PartialEq, Debug)]
pub struct Declare {
    pub var: Symbol,
    pub ty: SymbolPath,
}

#[derive(Clone, PartialEq, Debug)]
pub struct Assign {
    pub var: Symbol,
    pub value: Operand,
}

#[derive(Clone, PartialEq, Debug)]
pub struct DeclareAssign {
    pub var: Symbol,
    pub ty: SymbolPath,
    pub value: Operand,
}

#[derive(Clone, PartialEq, Debug)]
pub struct Cast {
    pub value: Operand,
    pub to: SymbolPath,
}

/// Arguments of a call: positional or keyword.
#[derive(Clone, PartialEq, Debug, Default)]
pub enum CallArgs {
    #[default]
    Empty,
    Args(ArgsBlock),
    ArgsValues(ArgsValuesBlock),
}

impl CallArgs {
    pub fn len(&self) -> usize {
        match self {
            CallArgs::Empty => 0,
            CallArgs::Args(block) => block.0.len(),
            CallArgs::ArgsValues(block) => block.0.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Trailing part of a call.
#[derive(Clone, PartialEq, Debug)]
pub enum CallShape {
    Bare,
    WithOption(Vec<OptionBlock>),
    WithBody(BodyBlock),
}

#[derive(Clone, PartialEq, Debug)]
pub struct Call {
    name: Symbol,
    args: CallArgs,
    shape: CallShape,
}

impl Call {
    /// Build a call. At most one of `options` and `body` may be present.
    pub fn new(
        name: Symbol,
        args: CallArgs,
        options: Option<Vec<OptionBlock>>,
        body: Option<BodyBlock>,
    ) -> Result<Self, IrError> {
        let shape = match (options, body) {
            (None, None) => CallShape::Bare,
            (Some(options), None) => CallShape::WithOption(options),
            (None, Some(body)) => CallShape::WithBody(body),
            (Some(_), Some(_)) => return Err(IrError::CallWithOptionAndBody { name }),
        };
        Ok(Call { name, args, shape })
    }

    pub fn bare(name: Symbol, args: CallArgs) -> Self {
        Call {
            name,
            args,
            shape: CallShape::Bare,
        }
    }

    pub fn name(&self) -> Symbol {
        self.name
    }

    pub fn args(&self) -> &CallArgs {
        &self.args
    }

    pub fn shape(&self) -> &CallShape {
        &self.shape
    }
}

#[derive(Clone, PartialEq, Debug)]
pub enum Instr {
    Declare(Declare),
    Assign(Assign),
    DeclareAssign(DeclareAssign),
    Call(Call),
    Cast(Cast),
}

impl Instr {
    pub fn flag(&self) -> IrFlag {
        match self {
            Instr::Declare(_) => IrFlag::Declare,
            Instr::Assign(_) => IrFlag::Assign,
            Instr::DeclareAssign(_) => IrFlag::DeclareAssign,
            Instr::Call(call) => match call.shape {
                CallShape::Bare => IrFlag::Call,
                CallShape::WithOption(_) => IrFlag::CallWithOption,
                CallShape::WithBody(_) => IrFlag::CallWithBody,
            },
            Instr::Cast(_) => IrFlag::Cast,
        }
    }

    pub fn declare(var: Symbol, ty: impl Into<SymbolPath>) -> Self {
        Instr::Declare(Declare { var, ty: ty.into() })
    }

    pub fn assign(var: Symbol, value: impl Into<Operand>) -> Self {
        Instr::Assign(Assign {
            var,
            value: value.into(),
        })
    }

    pub fn declare_assign(var: Symbol, ty: impl Into<SymbolPath>, value: impl Into<Operand>) -> Self {
        Instr::DeclareAssign(DeclareAssign {
            var,
            ty: ty.into(),
            value: value.into(),
        })
    }

    pub fn cast(value: impl Into<Operand>, to: impl Into<SymbolPath>) -> Self {
        Instr::Cast(Cast {
            value: value.into(),
            to: to.into(),
        })
    }

    pub fn call(name: Symbol, args: Vec<Operand>) -> Self {
        let args = if args.is_empty() {
            CallArgs::Empty
        } else {
            CallArgs::Args(ArgsBlock(args))
        };
        Instr::Call(Call::bare(name, args))
    }
}

/// Positional values.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct ArgsBlock(pub Vec<Operand>);

/// Keyword values, in written order.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct ArgsValuesBlock(pub Vec<(Symbol, Operand)>);

/// A sequence of nodes executed in order.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct BodyBlock(pub Vec<Node>);

/// One arm of a call-with-option: a matched option and the block it guards.
#[derive(Clone, PartialEq, Debug)]
pub struct OptionBlock {
    pub option: Operand,
    pub block: BodyBlock,
}

#[derive(Clone, PartialEq, Debug)]
pub enum Block {
    Args(ArgsBlock),
    ArgsValues(ArgsValuesBlock),
    Body(BodyBlock),
    Option(OptionBlock),
}

impl Block {
    pub fn flag(&self) -> BlockFlag {
        match self {
            Block::Args(_) => BlockFlag::Args,
            Block::ArgsValues(_) => BlockFlag::ArgsValues,
            Block::Body(_) => BlockFlag::Body,
            Block::Option(_) => BlockFlag::Option,
        }
    }
}

#[derive(Clone, PartialEq, Debug)]
pub enum Node {
    Instr(Instr),
    Block(Block),
}

impl From<Instr> for Node {
    fn from(instr: Instr) -> Self {
        Node::Instr(instr)
    }
}

impl From<Block> for Node {
    fn from(block: Block) -> Self {
        Node::Block(block)
    }
}
