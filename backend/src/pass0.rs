//! Pass 0: primitive type singletons + the builtin runtime signatures
use std::rc::Rc;

use ast::node::{DataType, PassMode};

use crate::{types::LangType, FunctionParam, FunctionSignature};

#[derive(Debug)]
pub struct Builtin {
    pub name: &'static str,
    pub signature: FunctionSignature,
}

#[derive(Debug)]
pub struct Pass0Program {
    int_type: Rc<LangType>,
    char_type: Rc<LangType>,
    bool_type: Rc<LangType>,
    void_type: Rc<LangType>,
    builtins: Vec<Builtin>,
}

impl Pass0Program {
    pub fn int_type(&self) -> Rc<LangType> {
        self.int_type.clone()
    }

    pub fn char_type(&self) -> Rc<LangType> {
        self.char_type.clone()
    }

    pub fn bool_type(&self) -> Rc<LangType> {
        self.bool_type.clone()
    }

    pub fn void_type(&self) -> Rc<LangType> {
        self.void_type.clone()
    }

    pub fn data_type(&self, ty: DataType) -> Rc<LangType> {
        match ty {
            DataType::Int => self.int_type(),
            DataType::Char => self.char_type(),
        }
    }

    pub fn builtins(&self) -> &[Builtin] {
        &self.builtins
    }
}

fn value_param(name: &str, ty: Rc<LangType>) -> FunctionParam {
    FunctionParam {
        name: name.to_owned(),
        ty,
        mode: PassMode::ByValue,
    }
}

fn ref_param(name: &str, ty: Rc<LangType>) -> FunctionParam {
    FunctionParam {
        name: name.to_owned(),
        ty,
        mode: PassMode::ByReference,
    }
}

pub fn pass0_program() -> Pass0Program {
    let int_type = Rc::new(LangType::Int);
    let char_type = Rc::new(LangType::Char);
    let bool_type = Rc::new(LangType::Bool);
    let void_type = Rc::new(LangType::Void);
    let string = Rc::new(LangType::Array(char_type.clone(), None));

    let sig = |return_type: &Rc<LangType>, params: Vec<FunctionParam>| FunctionSignature {
        return_type: return_type.clone(),
        params,
    };

    let builtins = vec![
        Builtin {
            name: "writeInteger",
            signature: sig(&void_type, vec![value_param("n", int_type.clone())]),
        },
        Builtin {
            name: "writeChar",
            signature: sig(&void_type, vec![value_param("c", char_type.clone())]),
        },
        Builtin {
            name: "writeString",
            signature: sig(&void_type, vec![ref_param("s", string.clone())]),
        },
        Builtin {
            name: "readInteger",
            signature: sig(&int_type, vec![]),
        },
        Builtin {
            name: "readChar",
            signature: sig(&char_type, vec![]),
        },
        Builtin {
            name: "readString",
            signature: sig(
                &void_type,
                vec![
                    value_param("n", int_type.clone()),
                    ref_param("s", string.clone()),
                ],
            ),
        },
        Builtin {
            name: "ascii",
            signature: sig(&int_type, vec![value_param("c", char_type.clone())]),
        },
        Builtin {
            name: "chr",
            signature: sig(&char_type, vec![value_param("n", int_type.clone())]),
        },
        Builtin {
            name: "strlen",
            signature: sig(&int_type, vec![ref_param("s", string.clone())]),
        },
        Builtin {
            name: "strcmp",
            signature: sig(
                &int_type,
                vec![
                    ref_param("a", string.clone()),
                    ref_param("b", string.clone()),
                ],
            ),
        },
        Builtin {
            name: "strcpy",
            signature: sig(
                &void_type,
                vec![
                    ref_param("dst", string.clone()),
                    ref_param("src", string.clone()),
                ],
            ),
        },
        Builtin {
            name: "strcat",
            signature: sig(
                &void_type,
                vec![ref_param("dst", string.clone()), ref_param("src", string)],
            ),
        },
    ];

    Pass0Program {
        int_type,
        char_type,
        bool_type,
        void_type,
        builtins,
    }
}
