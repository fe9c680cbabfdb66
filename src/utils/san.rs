//! Standard algebraic notation: `Nf3`, `exd5`, `O-O`, `e8=Q+`.
//!
//! Formatting needs the full legal move list for disambiguation and check
//! suffixes, so both directions work on a detached copy of the position.

use crate::errors::{ChessError, ChessResult, IllegalMoveReason};
use crate::game_state::chess_types::*;
use crate::move_generation::check_scanner::is_in_check;
use crate::utils::algebraic::{algebraic_to_square, file_char, rank_char};

fn piece_letter(kind: PieceKind) -> Option<char> {
    match kind {
        PieceKind::Pawn => None,
        other => Some(other.letter().to_ascii_uppercase()),
    }
}

fn is_castle(piece: ColoredPiece, mv: Move) -> bool {
    piece.kind == PieceKind::King && (mv.to.col - mv.from.col).abs() == 2
}

/// Format a legal move in SAN for the side to move in `position`.
pub fn move_to_san(position: &Position, mv: Move) -> ChessResult<String> {
    let mut scratch = position.detached_copy();
    if let Err(reason) = scratch.validator().validate_move(mv) {
        return Err(ChessError::IllegalMove { mv, reason });
    }
    let legal = scratch.legal_moves();
    san_for_legal_move(&mut scratch, mv, &legal)
}

fn san_for_legal_move(scratch: &mut Position, mv: Move, legal: &[Move]) -> ChessResult<String> {
    let piece = scratch.piece_at(mv.from).ok_or(ChessError::IllegalMove {
        mv,
        reason: IllegalMoveReason::NoPieceOnOrigin,
    })?;

    let mut san = String::with_capacity(8);
    if is_castle(piece, mv) {
        san.push_str(if mv.to.col > mv.from.col { "O-O" } else { "O-O-O" });
    } else {
        let is_capture = scratch.piece_at(mv.to).is_some()
            || (piece.kind == PieceKind::Pawn && mv.from.col != mv.to.col);

        match piece_letter(piece.kind) {
            Some(letter) => {
                san.push(letter);
                san.push_str(&disambiguation(scratch, piece, mv, legal));
            }
            None if is_capture => san.extend(file_char(mv.from.col)),
            None => {}
        }
        if is_capture {
            san.push('x');
        }
        san.push_str(&mv.to.to_string());
        if let Some(kind) = mv.promotion {
            san.push('=');
            san.extend(piece_letter(kind));
        }
    }

    let Some(_) = scratch.move_maker().make_legal_move(mv) else {
        return Err(ChessError::IllegalMove {
            mv,
            reason: IllegalMoveReason::NoPieceOnOrigin,
        });
    };
    let defender = scratch.turn();
    if is_in_check(scratch, defender) {
        san.push(if scratch.validator().has_legal_move(defender) { '+' } else { '#' });
    }
    scratch.move_maker().unmake_move();

    Ok(san)
}

/// Origin hint for a piece move: nothing if unique, else the file, else the
/// rank, else both.
fn disambiguation(position: &Position, piece: ColoredPiece, mv: Move, legal: &[Move]) -> String {
    let rivals: Vec<Square> = legal
        .iter()
        .filter(|other| other.to == mv.to && other.from != mv.from)
        .filter(|other| position.piece_at(other.from) == Some(piece))
        .map(|other| other.from)
        .collect();

    if rivals.is_empty() {
        return String::new();
    }
    let file = file_char(mv.from.col);
    let rank = rank_char(mv.from.row);
    if rivals.iter().all(|sq| sq.col != mv.from.col) {
        file.into_iter().collect()
    } else if rivals.iter().all(|sq| sq.row != mv.from.row) {
        rank.into_iter().collect()
    } else {
        file.into_iter().chain(rank).collect()
    }
}

/// Parsed pieces of a non-castling SAN token.
struct SanPattern {
    kind: PieceKind,
    from_col: Option<i8>,
    from_row: Option<i8>,
    to: Square,
    promotion: Option<PieceKind>,
}

fn parse_pattern(body: &str) -> Option<SanPattern> {
    let mut chars: Vec<char> = body.chars().filter(|ch| *ch != 'x' && *ch != ':').collect();

    let kind = match chars.first() {
        Some(ch) if "KQRBN".contains(*ch) => {
            let kind = PieceKind::from_letter(*ch)?;
            chars.remove(0);
            kind
        }
        _ => PieceKind::Pawn,
    };

    let promotion = match chars.as_slice() {
        [.., '=', letter] => {
            let kind = PieceKind::from_letter(*letter).filter(|k| k.is_promotion_target())?;
            chars.truncate(chars.len() - 2);
            Some(kind)
        }
        [.., digit, letter] if digit.is_ascii_digit() && "qrbnQRBN".contains(*letter) => {
            let kind = PieceKind::from_letter(*letter)?;
            chars.pop();
            Some(kind)
        }
        _ => None,
    };

    if chars.len() < 2 || chars.len() > 4 {
        return None;
    }
    let split = chars.len() - 2;
    let destination: String = chars[split..].iter().collect();
    let to = algebraic_to_square(&destination).ok()?;

    let mut from_col = None;
    let mut from_row = None;
    for &ch in &chars[..split] {
        match ch {
            'a'..='h' if from_col.is_none() => from_col = Some(ch as i8 - b'a' as i8),
            '1'..='8' if from_row.is_none() => from_row = Some(ch as i8 - b'1' as i8),
            _ => return None,
        }
    }

    Some(SanPattern {
        kind,
        from_col,
        from_row,
        to,
        promotion,
    })
}

/// Resolve a SAN token against the legal moves of the side to move. Check
/// and annotation suffixes are ignored, `0-0` is accepted for castling and
/// promotion letters may be lowercase.
pub fn san_to_move(san: &str, position: &Position) -> ChessResult<Move> {
    let unknown = || ChessError::UnknownMove(san.to_owned());
    let body = san.trim().trim_end_matches(['+', '#', '!', '?']);
    if body.is_empty() {
        return Err(unknown());
    }

    let mut scratch = position.detached_copy();
    let mover = scratch.turn();
    let legal = scratch.legal_moves();

    let matches: Vec<Move> = match body {
        "O-O" | "0-0" | "O-O-O" | "0-0-0" => {
            let king_side = body.len() == 3;
            legal
                .iter()
                .copied()
                .filter(|mv| {
                    scratch
                        .piece_at(mv.from)
                        .is_some_and(|piece| is_castle(piece, *mv))
                        && (mv.to.col > mv.from.col) == king_side
                })
                .collect()
        }
        _ => {
            let pattern = parse_pattern(body).ok_or_else(unknown)?;
            legal
                .iter()
                .copied()
                .filter(|mv| {
                    scratch.piece_at(mv.from) == Some(ColoredPiece::new(mover, pattern.kind))
                        && mv.to == pattern.to
                        && mv.promotion == pattern.promotion
                        && pattern.from_col.map_or(true, |col| col == mv.from.col)
                        && pattern.from_row.map_or(true, |row| row == mv.from.row)
                        && !(pattern.kind == PieceKind::King
                            && pattern.from_col.is_none()
                            && (mv.to.col - mv.from.col).abs() == 2)
                })
                .collect()
        }
    };

    match matches.as_slice() {
        [] => Err(unknown()),
        [mv] => Ok(*mv),
        _ => {
            log::debug!("SAN {san} matches {} legal moves", matches.len());
            Err(ChessError::AmbiguousMove(san.to_owned()))
        }
    }
}

/// SAN for every legal move of the side to move, in generator order.
pub fn legal_moves_san(position: &Position) -> ChessResult<Vec<(Move, String)>> {
    let mut scratch = position.detached_copy();
    let legal = scratch.legal_moves();
    legal
        .iter()
        .map(|mv| san_for_legal_move(&mut scratch, *mv, &legal).map(|san| (*mv, san)))
        .collect()
}
