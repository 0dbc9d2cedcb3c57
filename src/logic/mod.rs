//! Tournament business logic: repositories, pairing, results, stats, standings.

pub mod cleanup;
pub mod pairing;
pub mod players;
pub mod results;
pub mod settings;
pub mod standings;
pub mod stats;
pub mod tournaments;

pub use cleanup::{cleanup_test_data, clear_all_data, data_counts, CleanupSummary, DataCounts};
pub use pairing::{form_teams, generate_matches, generate_matches_with_rng, TierBuckets};
pub use players::{
    add_player, all_players, delete_player, player, player_stats, player_tournaments,
    search_players, update_player,
};
pub use results::{
    create_manual_match, delete_match, delete_uncompleted_matches, match_by_id, save_draw,
    save_results,
};
pub use settings::{
    apply_settings_update, clear_current_tournament, current_tournament, get_settings,
    set_current_tournament, update_settings,
};
pub use standings::{
    compare_for_ranking, overall_standings, rank, standings_to_csv, tournament_standings,
};
pub use stats::{
    compute_tournament_stats, player_tournament_stats, recompute_all_stats, recompute_stats,
    stats_input, update_player_totals, write_stats, StatsInput,
};
pub use tournaments::{
    add_player_to_tournament, all_tournaments, create_tournament, delete_tournament,
    remove_player_from_tournament, tournament, tournament_matches, tournament_players,
    update_tournament,
};
