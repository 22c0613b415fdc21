//! Headless playthrough: a careful clerk works consecutive days until one
//! fails. Run with `RUST_LOG=info` to watch the engine's shift log.

use bookrush_demo_core::{ClerkStyle, DemoSession};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut session = DemoSession::new(2024, 1, ClerkStyle::Careful)?;
    loop {
        let day = session.engine.day_number();
        let result = session.run_day()?;
        println!("day {day}: {}", result.message);
        println!(
            "  score {} | served {} | wrong {} | {:.1}s left",
            result.final_score,
            result.customers_served,
            result.wrong_orders,
            result.time_remaining
        );
        if !result.success || day >= 5 {
            break;
        }
        session.next_day();
    }

    Ok(())
}
