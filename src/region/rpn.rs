use crate::error::RegionError;

use super::{OpKind, Token};

/// Converts an infix region token sequence to Reverse Polish Notation
/// using the shunting-yard algorithm.
///
/// Complement is right-associative and binds tighter than intersection,
/// which binds tighter than union; the comparisons below run directly on
/// [`OpKind`]'s ordering, which encodes exactly that precedence.
///
/// # Errors
///
/// Returns [`RegionError::MismatchedParens`] for the given cell id if
/// the parentheses are unbalanced in either direction.
pub fn generate_rpn(cell_id: i32, infix: &[Token]) -> Result<Vec<Token>, RegionError> {
    let mut rpn = Vec::with_capacity(infix.len());
    let mut stack: Vec<OpKind> = Vec::new();

    for &token in infix {
        match token {
            Token::Halfspace(_) => rpn.push(token),

            Token::Op(OpKind::LeftParen) => stack.push(OpKind::LeftParen),

            Token::Op(OpKind::RightParen) => {
                // Pop operators until the matching left parenthesis.
                loop {
                    match stack.pop() {
                        Some(OpKind::LeftParen) => break,
                        Some(op) => rpn.push(Token::Op(op)),
                        None => return Err(RegionError::MismatchedParens(cell_id)),
                    }
                }
            }

            Token::Op(op) => {
                while let Some(&top) = stack.last() {
                    let pops = top != OpKind::LeftParen
                        && ((op == OpKind::Complement && op < top)
                            || (op != OpKind::Complement && op <= top));
                    if !pops {
                        break;
                    }
                    rpn.push(Token::Op(top));
                    stack.pop();
                }
                stack.push(op);
            }
        }
    }

    while let Some(op) = stack.pop() {
        if op == OpKind::LeftParen {
            return Err(RegionError::MismatchedParens(cell_id));
        }
        rpn.push(Token::Op(op));
    }

    Ok(rpn)
}
