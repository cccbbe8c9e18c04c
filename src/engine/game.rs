//! Game controller: owns the board and turn state, validates and commits moves.
//!
//! `Game` is the surface an input layer drives. It answers "where can this
//! piece go" for highlighting and turns a pick-up/drop pair into either a
//! committed move or a rejection that leaves everything untouched.

use serde::Serialize;
use tracing::debug;

use crate::config::{CastlingPolicy, RulesConfig};
use crate::engine::attacks::AttackMap;
use crate::engine::board::Board;
use crate::engine::legality::{self, Verdict};
use crate::engine::state::{EnPassant, GameState};
use crate::engine::types::{
    CastleSide, ChessError, Color, MoveError, Offset, Piece, PieceType, Square,
};

// =========================================================================
// MoveOutcome
// =========================================================================

/// Result of a move attempt, shaped for the input layer.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveOutcome {
    pub accepted: bool,
    pub captured: Option<Piece>,
    pub promoted: bool,
    pub castled: bool,
    /// The opponent is in check after the move.
    pub gives_check: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection: Option<MoveError>,
}

impl MoveOutcome {
    pub fn rejected(reason: MoveError) -> Self {
        MoveOutcome {
            rejection: Some(reason),
            ..Default::default()
        }
    }
}

// =========================================================================
// Game
// =========================================================================

#[derive(Clone, Debug)]
pub struct Game {
    board: Board,
    state: GameState,
    config: RulesConfig,
    /// Every piece removed by a capture, in capture order.
    captured: Vec<Piece>,
}

impl Game {
    // -----------------------------------------------------------------
    // Constructors
    // -----------------------------------------------------------------

    /// Create a new game from the standard starting position.
    pub fn new() -> Self {
        Self {
            board: Board::initial(),
            state: GameState::initial(),
            config: RulesConfig::default(),
            captured: Vec::new(),
        }
    }

    /// Replace the rules configuration.
    pub fn with_config(mut self, config: RulesConfig) -> Self {
        self.config = config;
        self
    }

    /// Create a game from a FEN string.
    ///
    /// Needs the placement, side, castling and en-passant fields; the two
    /// clock fields may follow and are ignored.
    pub fn from_fen(fen: &str) -> Result<Self, ChessError> {
        let fields: Vec<&str> = fen.split_whitespace().collect();
        if !(4..=6).contains(&fields.len()) {
            return Err(ChessError::InvalidFen(format!(
                "expected 4 to 6 fields, got {}",
                fields.len()
            )));
        }

        let board = Board::from_fen_placement(fields[0])?;

        let side_to_move = match fields[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => {
                return Err(ChessError::InvalidFen(format!(
                    "invalid side to move: '{other}'"
                )));
            }
        };

        let castling = GameState::castling_from_fen(fields[2])?;
        let en_passant = parse_en_passant(fields[3], side_to_move, &board)?;

        let mut king_squares = [Square(0); 2];
        for color in Color::BOTH {
            king_squares[color.index()] = board
                .find_king(color)
                .ok_or_else(|| ChessError::InvalidFen(format!("no {color} king")))?;
        }

        let mut game = Self {
            board,
            state: GameState {
                side_to_move,
                king_squares,
                in_check: [false; 2],
                en_passant,
                castling,
            },
            config: RulesConfig::default(),
            captured: Vec::new(),
        };
        game.refresh_check_flags();
        Ok(game)
    }

    // -----------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Pieces captured so far, oldest first.
    pub fn captured(&self) -> &[Piece] {
        &self.captured
    }

    pub fn side_to_move(&self) -> Color {
        self.state.side_to_move
    }

    pub fn is_in_check(&self, color: Color) -> bool {
        self.state.in_check[color.index()]
    }

    /// Current position as FEN (placement, side, castling, en passant).
    pub fn to_fen(&self) -> String {
        let side = match self.state.side_to_move {
            Color::White => 'w',
            Color::Black => 'b',
        };
        let ep = self
            .state
            .en_passant
            .and_then(|ep| ep.target(!self.state.side_to_move))
            .map_or_else(|| "-".to_string(), |sq| sq.to_algebraic());
        format!(
            "{} {side} {} {ep}",
            self.board.placement_fen(),
            self.state.castling_fen()
        )
    }

    // -----------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------

    /// Legal destinations for the piece on `sq`.
    ///
    /// Empty when the square is empty, off the board, or holds a piece of the
    /// side not to move. Never changes the game.
    pub fn legal_moves(&self, sq: Square) -> Vec<Square> {
        if !self
            .board
            .get(sq)
            .is_some_and(|p| p.color == self.state.side_to_move)
        {
            return Vec::new();
        }
        let mut board = self.board.clone();
        legality::legal_destinations(&mut board, &self.state, sq)
    }

    /// Validate `from -> to` without committing it.
    pub fn check_move(&self, from: Square, to: Square) -> Result<Verdict, MoveError> {
        let mut board = self.board.clone();
        validate(&mut board, &self.state, from, to)
    }

    // -----------------------------------------------------------------
    // Make move
    // -----------------------------------------------------------------

    /// Validate and commit a move. A rejection leaves the game untouched.
    pub fn try_move(&mut self, from: Square, to: Square) -> Result<MoveOutcome, MoveError> {
        match validate(&mut self.board, &self.state, from, to) {
            Ok(verdict) => Ok(self.commit(verdict)),
            Err(reason) => {
                debug!(%from, %to, reason = reason.code(), "move rejected");
                Err(reason)
            }
        }
    }

    /// Like [`Game::try_move`], folding a rejection into the outcome.
    pub fn attempt_move(&mut self, from: Square, to: Square) -> MoveOutcome {
        self.try_move(from, to)
            .unwrap_or_else(MoveOutcome::rejected)
    }

    /// Apply a verified move's side effects.
    ///
    /// Panics if the move is not a candidate for the piece on its origin:
    /// that is a caller bug, never user input.
    fn commit(&mut self, verdict: Verdict) -> MoveOutcome {
        let Verdict {
            piece, from, to, ..
        } = verdict;
        let color = piece.color;

        let pre_move = (piece.kind == PieceType::King)
            .then(|| AttackMap::build(&self.board, &self.state));
        assert!(
            self.board.get(from) == Some(piece)
                && legality::candidate_offsets(
                    piece,
                    from,
                    &self.board,
                    &self.state,
                    pre_move.as_ref()
                )
                .contains(&Offset::between(from, to)),
            "commit of unverified move {from} -> {to} (board:\n{})",
            self.board.board_string()
        );

        // 1-2. Direct or en-passant capture.
        let captured = verdict
            .captures
            .and_then(|sq| self.board.take(sq).map(|victim| (sq, victim)));
        if let Some((_, victim)) = captured {
            self.captured.push(victim);
        }

        // 3. Move the piece.
        let displaced = self.board.relocate(from, to);
        debug_assert!(displaced.is_none(), "capture left {to} occupied");

        // 4. The en-passant window lasts one reply.
        self.state.en_passant = verdict
            .double_step
            .then(|| EnPassant::after_double_step(to));

        // 5. Auto-promotion.
        if verdict.promotes {
            self.board.take(to);
            self.board.spawn(to, color, PieceType::Queen);
        }

        // 6. Castling rook and rights.
        if let Some(side) = verdict.castle {
            let rank = color.back_rank();
            self.board.relocate(
                Square::from_file_rank(side.rook_file(), rank),
                Square::from_file_rank(side.rook_target_file(), rank),
            );
        }
        self.update_castling_rights(piece, from, verdict.castle, captured);

        // 7. King square.
        if piece.kind == PieceType::King {
            self.state.king_squares[color.index()] = to;
        }

        // 8-9. Check flags from the position actually reached, then the turn.
        self.refresh_check_flags();
        self.state.side_to_move = !color;

        let outcome = MoveOutcome {
            accepted: true,
            captured: captured.map(|(_, victim)| victim),
            promoted: verdict.promotes,
            castled: verdict.castle.is_some(),
            gives_check: self.is_in_check(!color),
            rejection: None,
        };
        debug!(
            %from,
            %to,
            piece = %piece,
            captured = ?outcome.captured.map(|p| p.kind),
            en_passant = verdict.en_passant,
            promoted = outcome.promoted,
            castled = outcome.castled,
            check = outcome.gives_check,
            "move committed"
        );
        outcome
    }

    fn update_castling_rights(
        &mut self,
        piece: Piece,
        from: Square,
        castle: Option<CastleSide>,
        captured: Option<(Square, Piece)>,
    ) {
        let rights = &mut self.state.castling[piece.color.index()];
        match piece.kind {
            PieceType::King => {
                rights.king_moved = true;
                if let Some(side) = castle {
                    rights.mark_rook_moved(side);
                }
            }
            PieceType::Rook => match self.config.castling_policy {
                CastlingPolicy::Independent => {
                    if let Some(side) = home_corner(piece.color, from) {
                        rights.mark_rook_moved(side);
                    }
                }
                CastlingPolicy::Coarse => rights.king_moved = true,
            },
            _ => {}
        }

        if let Some((sq, victim)) = captured
            && victim.kind == PieceType::Rook
            && let Some(side) = home_corner(victim.color, sq)
        {
            self.state.castling[victim.color.index()].mark_rook_moved(side);
        }
    }

    fn refresh_check_flags(&mut self) {
        let attacks = AttackMap::build(&self.board, &self.state);
        for color in Color::BOTH {
            self.state.in_check[color.index()] =
                attacks.is_attacked(self.state.king_square(color), !color);
        }
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

// =========================================================================
// Helpers
// =========================================================================

/// Turn order first, then shape and king safety.
fn validate(
    board: &mut Board,
    state: &GameState,
    from: Square,
    to: Square,
) -> Result<Verdict, MoveError> {
    let piece = board
        .get(from)
        .ok_or(MoveError::NoPieceAtOrigin { square: from })?;
    if piece.color != state.side_to_move {
        return Err(MoveError::NotYourTurn {
            square: from,
            color: piece.color,
        });
    }
    legality::check_move(board, state, from, to)
}

/// Which castling rook starts on `sq` for `color`, if any.
fn home_corner(color: Color, sq: Square) -> Option<CastleSide> {
    CastleSide::BOTH
        .into_iter()
        .find(|side| sq == Square::from_file_rank(side.rook_file(), color.back_rank()))
}

/// Map a FEN en-passant target onto the window it implies.
fn parse_en_passant(
    field: &str,
    side_to_move: Color,
    board: &Board,
) -> Result<Option<EnPassant>, ChessError> {
    if field == "-" {
        return Ok(None);
    }
    let invalid = |why: &str| ChessError::InvalidFen(format!("invalid en passant '{field}': {why}"));

    let target = Square::from_algebraic(field).ok_or_else(|| invalid("not a square"))?;
    let moved = !side_to_move;
    let expected_rank = moved.pawn_rank() as i8 + moved.forward();
    if target.rank() as i8 != expected_rank {
        return Err(invalid("wrong rank"));
    }
    let pawn_square = Square::at(expected_rank + moved.forward(), target.file() as i8)
        .ok_or_else(|| invalid("off the board"))?;
    if !board
        .get(pawn_square)
        .is_some_and(|p| p.is(moved, PieceType::Pawn))
    {
        return Err(invalid("no pawn in front of the target"));
    }
    Ok(Some(EnPassant::after_double_step(pawn_square)))
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(name: &str) -> Square {
        Square::from_algebraic(name).unwrap()
    }

    fn play(g: &mut Game, from: &str, to: &str) -> MoveOutcome {
        g.try_move(sq(from), sq(to))
            .unwrap_or_else(|e| panic!("{from}{to} rejected: {e}"))
    }

    // -----------------------------------------------------------------
    // Construction
    // -----------------------------------------------------------------

    #[test]
    fn new_game() {
        let g = Game::new();
        assert_eq!(g.side_to_move(), Color::White);
        assert!(!g.is_in_check(Color::White));
        assert!(!g.is_in_check(Color::Black));
        assert!(g.captured().is_empty());
        assert_eq!(
            g.to_fen(),
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq -"
        );
    }

    #[test]
    fn game_from_fen() {
        let g =
            Game::from_fen("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1").unwrap();
        assert_eq!(g.side_to_move(), Color::Black);
        assert_eq!(
            g.state().en_passant,
            Some(EnPassant::after_double_step(sq("e4")))
        );
        assert_eq!(
            g.to_fen(),
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3"
        );
    }

    #[test]
    fn game_from_invalid_fen() {
        for fen in [
            "invalid",
            "8/8/8/8/8/8/8/8 w - -",
            "4k3/8/8/8/8/8/8/4K3 x - -",
            "4k3/8/8/8/8/8/8/4K3 w X -",
            "4k3/8/8/8/8/8/8/4K3 w - e4",
            "4k3/8/8/8/8/8/8/4K3 w - e6",
            "4k3/8/8/8/8/8/8/4K3 w - - 0 1 extra",
        ] {
            assert!(Game::from_fen(fen).is_err(), "accepted {fen}");
        }
    }

    #[test]
    fn check_flag_derived_on_load() {
        let g = Game::from_fen("4k3/8/8/8/8/8/8/4R1K1 b - -").unwrap();
        assert!(g.is_in_check(Color::Black));
        assert!(!g.is_in_check(Color::White));
    }

    // -----------------------------------------------------------------
    // Rejections
    // -----------------------------------------------------------------

    #[test]
    fn wrong_side_is_rejected() {
        let mut g = Game::new();
        assert_eq!(
            g.try_move(sq("e7"), sq("e5")),
            Err(MoveError::NotYourTurn {
                square: sq("e7"),
                color: Color::Black
            })
        );
        assert!(g.legal_moves(sq("e7")).is_empty());
    }

    #[test]
    fn empty_origin_is_rejected() {
        let mut g = Game::new();
        let outcome = g.attempt_move(sq("e4"), sq("e5"));
        assert!(!outcome.accepted);
        assert_eq!(
            outcome.rejection,
            Some(MoveError::NoPieceAtOrigin { square: sq("e4") })
        );
    }

    #[test]
    fn rejection_leaves_game_unchanged() {
        let mut g = Game::new();
        let board = g.board().clone();
        let state = g.state().clone();
        assert!(!g.attempt_move(sq("e2"), sq("e5")).accepted);
        assert!(!g.attempt_move(sq("b1"), sq("d2")).accepted);
        assert_eq!(*g.board(), board);
        assert_eq!(*g.state(), state);
    }

    // -----------------------------------------------------------------
    // Commit side effects
    // -----------------------------------------------------------------

    #[test]
    fn double_step_opens_en_passant() {
        let mut g = Game::new();
        let outcome = play(&mut g, "e2", "e4");
        assert!(outcome.accepted);
        assert_eq!(g.side_to_move(), Color::Black);
        assert_eq!(
            g.state().en_passant,
            Some(EnPassant::after_double_step(sq("e4")))
        );
        play(&mut g, "g8", "f6");
        assert_eq!(g.state().en_passant, None);
    }

    #[test]
    fn en_passant_removes_the_passed_pawn() {
        let mut g = Game::from_fen("4k3/8/8/3pP3/8/8/8/4K3 w - d6").unwrap();
        let victim = g.board().get(sq("d5")).unwrap();
        let outcome = play(&mut g, "e5", "d6");
        assert_eq!(outcome.captured, Some(victim));
        assert_eq!(g.board().get(sq("d5")), None);
        assert!(g.board().get(sq("d6")).is_some());
        assert_eq!(g.captured(), &[victim]);
    }

    #[test]
    fn promotion_spawns_a_queen() {
        let mut g = Game::from_fen("4k3/P7/8/8/8/8/8/4K3 w - -").unwrap();
        let pawn = g.board().get(sq("a7")).unwrap();
        let outcome = play(&mut g, "a7", "a8");
        assert!(outcome.promoted);
        let queen = g.board().get(sq("a8")).unwrap();
        assert!(queen.is(Color::White, PieceType::Queen));
        assert_ne!(queen.id, pawn.id);
        assert!(g.board().pieces().all(|(_, p)| p.id != pawn.id));
        // The new queen sees the king along the back rank.
        assert!(outcome.gives_check);
        assert!(g.is_in_check(Color::Black));
    }

    #[test]
    fn castling_moves_the_rook() {
        let mut g = Game::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq -").unwrap();
        let outcome = play(&mut g, "e1", "g1");
        assert!(outcome.castled);
        assert!(g.board().get(sq("f1")).unwrap().is(Color::White, PieceType::Rook));
        assert_eq!(g.board().get(sq("h1")), None);
        assert_eq!(g.state().king_square(Color::White), sq("g1"));
        assert_eq!(g.state().castling_fen(), "kq");

        let outcome = play(&mut g, "e8", "c8");
        assert!(outcome.castled);
        assert!(g.board().get(sq("d8")).unwrap().is(Color::Black, PieceType::Rook));
        assert_eq!(g.state().castling_fen(), "-");
    }

    #[test]
    fn rook_move_policy() {
        let fen = "r3k2r/8/8/8/8/8/8/R3K2R w KQkq -";

        let mut g = Game::from_fen(fen).unwrap();
        play(&mut g, "h1", "h2");
        assert_eq!(g.state().castling_fen(), "Qkq");

        let mut g = Game::from_fen(fen).unwrap().with_config(RulesConfig {
            castling_policy: CastlingPolicy::Coarse,
        });
        play(&mut g, "h1", "h2");
        assert_eq!(g.state().castling_fen(), "kq");
    }

    #[test]
    fn capturing_a_home_rook_clears_its_right() {
        let mut g = Game::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq -").unwrap();
        let outcome = play(&mut g, "a1", "a8");
        assert!(outcome
            .captured
            .is_some_and(|p| p.is(Color::Black, PieceType::Rook)));
        assert_eq!(g.state().castling_fen(), "Kk");
        assert!(outcome.gives_check);
        assert!(g.is_in_check(Color::Black));
    }

    #[test]
    fn check_flags_follow_the_position() {
        let mut g = Game::from_fen("4k3/8/8/8/8/8/8/R3K3 w - -").unwrap();
        let outcome = play(&mut g, "a1", "a8");
        assert!(outcome.gives_check);
        assert!(g.is_in_check(Color::Black));
        play(&mut g, "e8", "e7");
        assert!(!g.is_in_check(Color::Black));
    }

    #[test]
    fn check_move_does_not_commit() {
        let g = Game::new();
        let v = g.check_move(sq("e2"), sq("e4")).unwrap();
        assert!(v.double_step);
        assert_eq!(g.side_to_move(), Color::White);
        assert_eq!(g.state().en_passant, None);
    }

    #[test]
    fn outcome_serializes_camel_case() {
        let mut g = Game::new();
        let outcome = g.attempt_move(sq("e2"), sq("e4"));
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "accepted": true,
                "captured": null,
                "promoted": false,
                "castled": false,
                "givesCheck": false,
            })
        );

        let outcome = g.attempt_move(sq("e4"), sq("e5"));
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["accepted"], false);
        assert_eq!(json["rejection"]["code"], "NOT_YOUR_TURN");
        assert_eq!(json["rejection"]["square"], "e4");
        assert_eq!(json["rejection"]["color"], "white");
    }
}
