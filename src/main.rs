//! LSMSIM - LSM-Tree Simulation Engine
//! Interactive shell that drives the engine and prints its state.

use std::io::{self, BufRead, Write};

use lsmsim::config::Config;
use lsmsim::engine::events::EventLog;
use lsmsim::engine::Engine;

fn main() {
    env_logger::init();

    println!();
    println!("  ╔═══════════════════════════════════════════╗");
    println!("  ║           LSMSIM Tree Visualizer          ║");
    println!("  ║    WAL · MemTable · Leveled SSTables      ║");
    println!("  ╚═══════════════════════════════════════════╝");
    println!();
    println!("  Commands:");
    println!("    set <key> <value>  - Write a key-value pair");
    println!("    get <key>          - Read a key");
    println!("    del <key>          - Delete a key (tombstone)");
    println!("    flush              - Flush the memtable to L0");
    println!("    compact <level>    - Compact a level into the next one");
    println!("    force              - Flush, then compact L0");
    println!("    bulk [n]           - Write n generated keys (default 20)");
    println!("    limit <n>          - Set the memtable limit");
    println!("    state              - Show memtable and levels");
    println!("    wal                - Show the WAL tail");
    println!("    stats              - Show engine counters");
    println!("    events             - Show recent engine events");
    println!("    clear              - Reset everything");
    println!("    exit               - Quit");
    println!();

    let config = Config::default();
    let events = EventLog::new(config.event_log_capacity);
    let mut engine = match Engine::new(config) {
        Ok(e) => e,
        Err(err) => {
            eprintln!("[ERROR] Failed to create engine: {}", err);
            std::process::exit(1);
        }
    };
    engine.subscribe(Box::new(events.clone()));

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut bulk_round = 0u64;

    loop {
        print!("lsmsim> ");
        let _ = stdout.flush();

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break, // EOF
            Ok(_) => {}
            Err(err) => {
                eprintln!("[ERROR] Failed to read input: {}", err);
                break;
            }
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.is_empty() {
            continue;
        }

        match parts[0].to_lowercase().as_str() {
            "set" | "write" | "put" => {
                if parts.len() < 3 {
                    println!("  Usage: set <key> <value>");
                    continue;
                }
                engine.write(parts[1], parts[2..].join(" "));
                println!("  OK");
            }
            "get" | "read" => {
                if parts.len() < 2 {
                    println!("  Usage: get <key>");
                    continue;
                }
                let lookup = engine.lookup(parts[1]);
                match lookup.value {
                    Some(value) => println!("  \"{}\" (from {})", value, lookup.source),
                    None if lookup.tombstone => println!("  (nil) deleted in {}", lookup.source),
                    None => println!("  (nil)"),
                }
            }
            "del" | "delete" => {
                if parts.len() < 2 {
                    println!("  Usage: del <key>");
                    continue;
                }
                engine.delete(parts[1]);
                println!("  OK (deleted)");
            }
            "flush" => {
                engine.flush();
                println!("  OK");
            }
            "compact" => match parts.get(1).map(|s| s.parse::<usize>()) {
                Some(Ok(level)) => {
                    engine.compact(level);
                    println!("  OK");
                }
                _ => println!("  Usage: compact <level>"),
            },
            "force" => {
                engine.force_compaction();
                println!("  OK");
            }
            "bulk" => {
                let count = match parts.get(1).map(|s| s.parse::<usize>()) {
                    None => 20,
                    Some(Ok(n)) => n,
                    Some(Err(_)) => {
                        println!("  Usage: bulk [n]");
                        continue;
                    }
                };
                bulk_round += 1;
                for i in 0..count {
                    engine.write(
                        format!("bulk_key_{}", i),
                        format!("bulk_value_{}_{}", bulk_round, i),
                    );
                }
                println!("  Wrote {} keys", count);
            }
            "limit" => match parts.get(1).map(|s| s.parse::<usize>()) {
                Some(Ok(limit)) => {
                    engine.set_memtable_limit(limit);
                    println!("  Memtable limit: {}", engine.memtable_limit());
                }
                _ => println!("  Usage: limit <n>"),
            },
            "state" | "show" => print_state(&engine),
            "wal" => {
                let tail = engine.wal_tail(engine.config().wal_tail_len);
                if tail.is_empty() {
                    println!("  (empty)");
                }
                for record in tail {
                    println!("  {}", record);
                }
            }
            "info" | "stats" => println!("{}", engine.metrics().report()),
            "events" | "log" => {
                for event in events.events() {
                    println!("  {}", event);
                }
            }
            "clear" => {
                events.clear();
                engine.clear();
                println!("  OK (cleared)");
            }
            "exit" | "quit" | "q" => {
                println!("  Bye.");
                break;
            }
            _ => {
                println!("  Unknown command: '{}'. Type 'exit' to quit.", parts[0]);
            }
        }
    }
}

fn print_state(engine: &Engine) {
    println!(
        "  MemTable ({}/{}):",
        engine.memtable().len(),
        engine.memtable_limit()
    );
    for (key, entry) in engine.memtable().entries() {
        println!("    {}:{}", key, entry.value.as_deref().unwrap_or("<tombstone>"));
    }

    for level in engine.levels() {
        println!("  L{} ({} files):", level.index(), level.len());
        for table in level.tables() {
            let range = table
                .key_range()
                .map(|r| format!(" [{}]", r))
                .unwrap_or_default();
            let overlap = if level.index() == 0 { " (overlapping)" } else { "" };
            println!("    SSTable {}{}{}", table.id(), range, overlap);
            for (key, entry) in table.entries() {
                println!(
                    "      {}:{}",
                    key,
                    entry.value.as_deref().unwrap_or("<tombstone>")
                );
            }
        }
    }
}
