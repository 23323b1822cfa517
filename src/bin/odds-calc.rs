use blackjack_odds::{DealerResolution, OddsSolver, Rank, SolverConfig};
use clap::Parser;

#[derive(Parser)]
#[command(
    name = "odds-calc",
    about = "Expected values for a blackjack decision point against a depleted shoe"
)]
struct Args {
    /// Remaining shoe as comma-separated ranks (1 = ace, 10 = ten/face).
    /// When omitted, a fresh shoe is built from --num-decks with the hand
    /// and up-card removed.
    #[arg(long)]
    deck: Option<String>,

    /// Number of full decks for the generated shoe
    #[arg(long, default_value = "1")]
    num_decks: u8,

    /// Player hand as comma-separated ranks, e.g. "10,6"
    #[arg(long)]
    hand: String,

    /// Dealer up-card rank
    #[arg(long)]
    dealer: u8,

    /// Dealer trials per stand-EV estimate (0 = exact enumeration)
    #[arg(long, default_value = "250")]
    trials: u32,

    /// Further splits a post-split hand may take
    #[arg(long, default_value = "1")]
    split_depth: u8,

    /// Seed for the sampler (omit for a fresh seed per run)
    #[arg(long)]
    seed: Option<u64>,
}

fn main() {
    let args = Args::parse();

    let hand = parse_ranks(&args.hand);
    let deck = match &args.deck {
        Some(spec) => parse_ranks(spec),
        None => fresh_shoe(args.num_decks, &hand, args.dealer),
    };

    let dealer_resolution = if args.trials == 0 {
        DealerResolution::Exact
    } else {
        DealerResolution::MonteCarlo {
            trials: args.trials,
        }
    };
    let config = SolverConfig {
        dealer_resolution,
        max_split_depth: args.split_depth,
    };

    eprintln!("Shoe:   {} cards", deck.len());
    eprintln!("Hand:   {:?}", hand);
    eprintln!("Dealer: {}", args.dealer);
    eprintln!(
        "Mode:   {}",
        if args.trials == 0 {
            "exact dealer enumeration".to_string()
        } else {
            format!("{} dealer trials", args.trials)
        }
    );

    let mut solver = match args.seed {
        Some(seed) => OddsSolver::seeded(config, seed),
        None => OddsSolver::new(config),
    };
    let odds = solver
        .get_odds(&deck, &hand, args.dealer)
        .unwrap_or_else(|e| {
            eprintln!("Solve failed: {e}");
            std::process::exit(1);
        });

    println!("Stand:  {:+.2}", odds.stand);
    println!("Hit:    {:+.2}", odds.hit);
    if odds.double.is_finite() {
        println!("Double: {:+.2}", odds.double);
    } else {
        println!("Double: n/a");
    }
    match odds.split {
        Some(ev) => println!("Split:  {ev:+.2}"),
        None => println!("Split:  n/a"),
    }
}

fn parse_ranks(spec: &str) -> Vec<Rank> {
    spec.split(',')
        .map(|part| {
            part.trim().parse().unwrap_or_else(|_| {
                eprintln!("Invalid rank '{part}', expected integers 1..=10");
                std::process::exit(1);
            })
        })
        .collect()
}

/// Full shoe of `num_decks` decks with the table cards taken out.
fn fresh_shoe(num_decks: u8, hand: &[Rank], dealer: Rank) -> Vec<Rank> {
    let mut deck = Vec::new();
    for _ in 0..num_decks {
        for rank in 1..=9 {
            deck.extend(std::iter::repeat(rank).take(4));
        }
        deck.extend(std::iter::repeat(10).take(16));
    }
    for &card in hand.iter().chain(std::iter::once(&dealer)) {
        match deck.iter().position(|&r| r == card) {
            Some(i) => {
                deck.swap_remove(i);
            }
            None => {
                eprintln!("Cannot remove a {card} from a {num_decks}-deck shoe");
                std::process::exit(1);
            }
        }
    }
    deck
}
